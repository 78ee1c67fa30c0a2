//! Master output level.

use crate::{Error, Result};
use atomic_float::AtomicF32;
use std::sync::atomic::Ordering;

/// Output gain applied after the track mix, before clamping.
///
/// Shared between a reader and the control side; setting it never waits
/// for the audio thread.
#[derive(Debug)]
pub struct MasterVolume {
    value: AtomicF32,
}

impl Default for MasterVolume {
    fn default() -> Self {
        Self::new()
    }
}

impl MasterVolume {
    /// Unity gain.
    pub fn new() -> Self {
        Self {
            value: AtomicF32::new(1.0),
        }
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.value.load(Ordering::Acquire)
    }

    /// Must be finite and non-negative.
    pub fn set(&self, volume: f32) -> Result<()> {
        if !volume.is_finite() || volume < 0.0 {
            return Err(Error::InvalidVolume(volume));
        }
        self.value.store(volume, Ordering::Release);
        Ok(())
    }
}
