//! Error types returned by every client operation.

use thiserror::Error;

/// Failures while backfilling direction identifiers from a stop summary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationError {
    #[error("Stop number {stop} has no routes.")]
    NoRoutes { stop: i64 },

    #[error("Stop number {stop} has no route with number {route}.")]
    UnknownRoute { stop: i64, route: i64 },

    #[error("Stop number {stop} has route with number {route}, but not direction {direction}.")]
    UnknownDirection {
        stop: i64,
        route: i64,
        direction: String,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    /// Missing or blank credentials. Raised while building a [`crate::Config`].
    #[error("{0}")]
    Configuration(String),

    /// Bad caller input, detected before any request is issued.
    #[error("{0}")]
    Validation(String),

    /// Whatever the fetch collaborator reported, passed through untouched.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),

    #[error("Invalid server response for {operation}.")]
    MalformedResponse { operation: &'static str },

    /// The provider answered with one of its coded errors.
    #[error("{message}")]
    Upstream { code: Option<i64>, message: String },

    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),
}

impl Error {
    /// Numeric provider error code, when the upstream error carried one.
    pub fn code(&self) -> Option<i64> {
        match self {
            Error::Upstream { code, .. } => *code,
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconciliation_messages() {
        let err = Error::from(ReconciliationError::UnknownRoute { stop: 3000, route: 95 });
        assert_eq!(err.to_string(), "Stop number 3000 has no route with number 95.");

        let err = Error::from(ReconciliationError::UnknownDirection {
            stop: 3000,
            route: 95,
            direction: "West".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Stop number 3000 has route with number 95, but not direction West."
        );
    }

    #[test]
    fn test_code_only_on_upstream_errors() {
        let upstream = Error::Upstream {
            code: Some(10),
            message: "Invalid stop number".to_string(),
        };
        assert_eq!(upstream.code(), Some(10));
        assert_eq!(upstream.to_string(), "Invalid stop number");

        let malformed = Error::MalformedResponse {
            operation: "GetNextTripsForStop",
        };
        assert_eq!(malformed.code(), None);
        assert_eq!(
            malformed.to_string(),
            "Invalid server response for GetNextTripsForStop."
        );
    }

    #[test]
    fn test_transport_error_is_passed_through() {
        let err = Error::from(anyhow::anyhow!("connection reset"));
        assert_eq!(err.to_string(), "connection reset");
    }
}
