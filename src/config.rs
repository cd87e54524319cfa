//! Client configuration.
//!
//! [`Credentials`] holds the API key and application id issued by the
//! provider. [`Config`] pairs them with the API base URL and is handed to the
//! client once, at construction.

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "http://api.octranspo1.com/v1.2";

pub const API_KEY_VAR: &str = "OC_TRANSPO_API_KEY";
pub const APP_ID_VAR: &str = "OC_TRANSPO_APP_ID";
pub const BASE_URL_VAR: &str = "OC_TRANSPO_BASE_URL";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    application_id: String,
}

impl Credentials {
    /// Trims both values and rejects blank ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if either value is blank after trimming.
    pub fn new(api_key: impl AsRef<str>, application_id: impl AsRef<str>) -> Result<Self> {
        let api_key = api_key.as_ref().trim();
        let application_id = application_id.as_ref().trim();

        if api_key.is_empty() {
            return Err(Error::Configuration("Missing OC Transpo API key.".to_string()));
        }

        if application_id.is_empty() {
            return Err(Error::Configuration(
                "Missing OC Transpo application identifier.".to_string(),
            ));
        }

        Ok(Self {
            api_key: api_key.to_string(),
            application_id: application_id.to_string(),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }
}

// Keep the key out of logs and panics.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("application_id", &self.application_id)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub base_url: String,
}

impl Config {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builds a config from `OC_TRANSPO_API_KEY`, `OC_TRANSPO_APP_ID` and the
    /// optional `OC_TRANSPO_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if either credential is unset or blank.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR).unwrap_or_default();
        let application_id = std::env::var(APP_ID_VAR).unwrap_or_default();
        let config = Self::new(Credentials::new(api_key, application_id)?);

        Ok(match std::env::var(BASE_URL_VAR) {
            Ok(url) if !url.trim().is_empty() => config.with_base_url(url.trim()),
            _ => config,
        })
    }
}
