//! Error types for toid-export

use std::io;
use thiserror::Error;

/// Export error type
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid export options
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// WAV encoding error
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;
