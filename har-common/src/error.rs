//! Common error types for the HAR tools

use thiserror::Error;

/// Common result type for HAR operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the HAR crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML file could not be parsed
    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input (unknown direction name, class id, label)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
