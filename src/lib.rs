//! Client for the OC Transpo stop and trip API.
//!
//! The provider renders XML as JSON, so its payloads are loosely shaped:
//! numbers arrive as text, repeated elements may be a single object, an array
//! or missing, and vehicle details are packed into short codes. This crate
//! turns those payloads into the typed model in [`model`].

pub mod assemble;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod output;
pub mod parser;
pub mod reconcile;
pub mod shape;
pub mod vehicle;

pub use client::OcTranspo;
pub use config::{Config, Credentials};
pub use error::{Error, ReconciliationError, Result};
pub use reconcile::{OneOrMany, ReconcileOptions, Reconciled};
