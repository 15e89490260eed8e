//! Common error types for wmf

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for wmf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by the wmf crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML file present but not parseable
    #[error("Invalid TOML in {path}: {message}")]
    TomlDecode { path: PathBuf, message: String },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configured value is outside its accepted range or vocabulary
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
