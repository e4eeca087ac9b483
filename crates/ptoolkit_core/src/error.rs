//! Application error types for the codec, session and settings layers.
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Could not load source dataset: {0}")]
    SourceLoad(String),

    #[error("Corrupt target dataset at line {line}, column {column}: {value:?} is not a valid label")]
    CorruptTarget {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Extraction error: {0}")]
    Extract(String),
}

impl AppError {
    /// Whether the error should end the session.
    ///
    /// `NotFound` and `InvalidLabel` are returned to the caller for a local
    /// retry; everything else is surfaced to the user and terminates.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AppError::NotFound(_) | AppError::InvalidLabel(_))
    }
}
