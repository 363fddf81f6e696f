//! Error types for ShipQuote.
//!
//! Library crates use [`ShipQuoteError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all ShipQuote operations.
#[derive(Debug, thiserror::Error)]
pub enum ShipQuoteError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to the VIN decoder, lead endpoint, or form source.
    #[error("network error: {0}")]
    Network(String),

    /// Payload parsing error (form configuration, decoder response).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// User input failed a local check; no external call was made.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A VIN lookup is already running for this vehicle.
    #[error("a VIN lookup is already in progress for this vehicle")]
    LookupPending,

    /// A lead submission is already in flight.
    #[error("a submission is already in progress")]
    SubmissionInFlight,

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ShipQuoteError>;

impl ShipQuoteError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error was raised by a local check before any external call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::LookupPending | Self::SubmissionInFlight
        )
    }
}
