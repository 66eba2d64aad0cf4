#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use apiref_core::AppError;
use derive_more::{Display, From};

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Failure reported by the resolution engine.
    #[display("{}", _0)]
    App(AppError),

    /// Output could not be rendered as JSON.
    #[display("JSON Error: {}", _0)]
    Json(serde_json::Error),

    /// Output could not be rendered as YAML.
    #[display("YAML Error: {}", _0)]
    Yaml(serde_yaml::Error),

    /// General failure message.
    #[display("Operation failed: {}", _0)]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_passes_through() {
        let err: CliError = AppError::Cancelled.into();
        assert_eq!(err.to_string(), "Resolution cancelled");
    }
}
