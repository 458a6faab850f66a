//! Domain error types
//!
//! Errors here cover construction and configuration paths only. The
//! anonymization call path is total by contract and never surfaces an
//! error to the caller; see the pipeline documentation.

use thiserror::Error;

/// Main Veil error type
///
/// Construction-path errors surfaced by config loading and logging
/// setup. Message strings are wrapped so third-party error types don't
/// leak into the public API.
#[derive(Debug, Error)]
pub enum VeilError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<toml::de::Error> for VeilError {
    fn from(err: toml::de::Error) -> Self {
        VeilError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VeilError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");

        let err = VeilError::Io("file vanished".to_string());
        assert_eq!(err.to_string(), "I/O error: file vanished");
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: VeilError = toml_err.into();
        assert!(matches!(err, VeilError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let err = VeilError::Configuration("test".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
