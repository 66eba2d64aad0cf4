//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Content problems (unparseable documents, missing fragment targets, unknown
//! URIs) are never errors: they are recovered inside the reference engine.
//! Only I/O faults, cancellation and malformed configuration surface here.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Wrapper for HTTP client errors raised while fetching remote documents.
    #[display("HTTP Error: {_0}")]
    Http(reqwest::Error),

    /// A document could not be loaded from its location.
    #[from(ignore)]
    #[display("Failed to fetch '{location}': {message}")]
    Fetch {
        /// The file path or URL that was requested.
        location: String,
        /// Underlying failure description.
        message: String,
    },

    /// Resolver options could not be read or parsed.
    #[from(ignore)]
    #[display("Invalid resolver options: {_0}")]
    Options(String),

    /// The resolution run was cancelled by its caller.
    #[from(ignore)]
    #[display("Resolution cancelled")]
    Cancelled,

    /// The resolution run exceeded its deadline (in seconds).
    #[from(ignore)]
    #[display("Resolution timed out after {_0}s")]
    Timeout(u64),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
