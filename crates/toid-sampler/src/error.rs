//! Error types.

use std::path::PathBuf;
use thiserror::Error;

/// Error type.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file is not valid TOML or does not match the catalog layout.
    #[error("Failed to parse catalog: {0}")]
    Toml(#[from] toml::de::Error),

    /// Catalog parsed but describes something unusable.
    #[error("Invalid catalog '{catalog}': {reason}")]
    Catalog { catalog: String, reason: String },

    /// A file referenced by a catalog does not exist.
    #[error("Catalog '{catalog}' references missing file {}", path.display())]
    MissingFile { catalog: String, path: PathBuf },

    /// No registered catalog provides this instrument.
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    /// Instrument names have the form `catalog.instrument`.
    #[error("Invalid instrument name '{0}', expected 'catalog.instrument'")]
    InvalidName(String),

    /// WAV decoding error.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;
