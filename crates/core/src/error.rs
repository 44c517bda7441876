//! Error types for Grandview Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The record store rejected the call or could not be reached
    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// A raw field could not be decoded into its domain type
    #[error("Malformed field {collection}.{field}: {reason}")]
    MalformedField {
        collection: &'static str,
        field: &'static str,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Caller-side helpers for deciding whether a failure is fatal
pub trait ResultExt<T> {
    /// Log the error and fall back to an empty value so a view keeps rendering
    fn or_empty(self) -> T
    where
        T: Default;
}

impl<T> ResultExt<T> for Result<T> {
    fn or_empty(self) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, "Falling back to empty result");
                T::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_empty_keeps_value() {
        let ok: Result<Vec<u32>> = Ok(vec![1, 2]);
        assert_eq!(ok.or_empty(), vec![1, 2]);
    }

    #[test]
    fn test_or_empty_falls_back() {
        let err: Result<Vec<u32>> = Err(Error::Gateway("offline".to_string()));
        assert!(err.or_empty().is_empty());
    }

    #[test]
    fn test_malformed_field_message() {
        let err = Error::MalformedField {
            collection: "room_c",
            field: "notes_c",
            reason: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed field room_c.notes_c: expected value"
        );
    }
}
