//! Common error types for TomatoMato

use thiserror::Error;

/// Common result type for TomatoMato operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across TomatoMato crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model artifact could not be loaded or a prediction failed
    #[error("Model error: {0}")]
    Model(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
