//! Error types for cow_trie
//!
//! Store and trie operations are total and never fail. These errors cover the
//! surfaces around them: parsing shell scripts, reading input and writing output.

use thiserror::Error;

/// Result type alias for cow_trie operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside the core store operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Unknown command on line {line}: {command}")]
    UnknownCommand { line: usize, command: String },

    #[error("Unknown value type: {0}")]
    UnknownType(String),

    #[error("Invalid stress configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// The script line an error points at, if it came from parsing one
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Parse { line, .. } | Error::UnknownCommand { line, .. } => Some(*line),
            _ => None,
        }
    }
}
