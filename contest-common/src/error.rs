//! Common error types for the contest services

use thiserror::Error;

/// Common result type for contest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by the contest crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be located or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file is not valid TOML for [`crate::config::TomlConfig`]
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Caller supplied a value the store refuses
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
