//! Error handling for SloperKit
//!
//! A malformed drawing at the ingest boundary is the only fatal condition;
//! everything downstream of a successful parse is best-effort and skips
//! individual entities instead of failing. The variants here cover the
//! fatal boundary plus I/O and encoding failures in the outer layers.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Unified error type for SloperKit public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// The drawing input could not be parsed into the data model.
    #[error("Failed to parse drawing: {reason}")]
    Parse {
        /// Why the input was rejected.
        reason: String,
    },

    /// A configuration file was present but invalid.
    #[error("Invalid configuration: {reason}")]
    Config {
        /// Why the configuration was rejected.
        reason: String,
    },

    /// A rendered piece could not be encoded as PNG.
    #[error("Failed to encode image: {reason}")]
    ImageEncode {
        /// Why encoding failed.
        reason: String,
    },

    /// Standard I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a parse error from a string message.
    pub fn parse(reason: impl Into<String>) -> Self {
        Error::Parse {
            reason: reason.into(),
        }
    }

    /// Create a configuration error from a string message.
    pub fn config(reason: impl Into<String>) -> Self {
        Error::Config {
            reason: reason.into(),
        }
    }
}

/// Result type using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
