//! Error types for toid-core.

use crate::event::SamplePosition;
use thiserror::Error;

/// Error type for toid-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Event at {at} on track '{track}' is earlier than the last recorded event at {last}")]
    NonMonotonicEvent {
        track: String,
        at: SamplePosition,
        last: SamplePosition,
    },

    #[error("Invalid pitch: {0}. Must be finite")]
    InvalidPitch(f32),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Invalid volume: {0}. Must be finite and non-negative")]
    InvalidVolume(f32),

    #[error("Invalid device: {0}")]
    InvalidDevice(String),

    #[cfg(feature = "audio-io")]
    #[error("Audio device not available")]
    DeviceNotAvailable(#[from] cpal::DefaultStreamConfigError),

    #[cfg(feature = "audio-io")]
    #[error("Failed to build audio stream")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[cfg(feature = "audio-io")]
    #[error("Failed to play audio stream")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[cfg(feature = "audio-io")]
    #[error("Failed to enumerate devices")]
    DevicesError(#[from] cpal::DevicesError),

    #[cfg(feature = "audio-io")]
    #[error("Failed to get device name")]
    DeviceNameError(#[from] cpal::DeviceNameError),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
