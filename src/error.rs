//! Centralized error type for the toid umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] toid_core::Error),

    #[error("Notation: {0}")]
    Notation(#[from] toid_notation::Error),

    #[error("Sampler: {0}")]
    Sampler(#[from] toid_sampler::Error),

    #[cfg(feature = "export")]
    #[error("Export: {0}")]
    Export(#[from] toid_export::ExportError),

    /// Inbound remote message could not be decoded.
    #[error("Failed to decode remote message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode remote message: {0}")]
    Encode(#[source] serde_json::Error),

    /// The remote transport has no receiving end.
    #[error("Remote connection closed")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, Error>;
