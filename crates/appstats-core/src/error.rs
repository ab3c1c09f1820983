//! Error types for `appstats` core library.

use thiserror::Error;

/// Result type alias using `appstats` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `appstats` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
