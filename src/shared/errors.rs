//! Engine error type
//!
//! Every fallible engine operation returns `EngineResult<T>`. Most callers inside
//! the engine log these and degrade to an empty/default value instead of
//! propagating them.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Reading from or writing to the OS clipboard failed
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// The persisted history slot could not be opened, read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// History or settings could not be encoded/decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File system error
    #[error("I/O error: {0}")]
    Io(String),

    /// Settings location could not be resolved
    #[error("Configuration error: {0}")]
    Config(String),

    /// No async runtime available for the poll loop
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
