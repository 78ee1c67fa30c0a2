//! Engine configuration.

use crate::event::SamplePosition;
use crate::{Error, Result};

/// Default sample rate, matching the rate the notation tick is derived from.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Default number of frames rendered per block.
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// Default notation tick: a quarter of a second at 44.1 kHz.
pub const DEFAULT_TICK: SamplePosition = 44_100 / 4;

/// Configuration for the sequencing engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ToidConfig {
    pub sample_rate: u32,
    /// Frames per rendered block (offline rendering and the manual pump).
    pub block_size: usize,
    /// Frames occupied by one melody-notation token.
    pub tick: SamplePosition,
}

impl Default for ToidConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
            tick: DEFAULT_TICK,
        }
    }
}

impl ToidConfig {
    pub fn validate(&self) -> Result<()> {
        if !(8_000..=384_000).contains(&self.sample_rate) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        if self.block_size == 0 || self.block_size > 16_384 {
            return Err(Error::InvalidConfig(format!(
                "block_size {} out of range (1-16384 frames)",
                self.block_size
            )));
        }
        if self.tick == 0 {
            return Err(Error::InvalidConfig("tick must be at least one frame".into()));
        }
        Ok(())
    }

    /// Number of frames covering `seconds` at the configured rate.
    pub fn frames_for(&self, seconds: f64) -> SamplePosition {
        (seconds.max(0.0) * self.sample_rate as f64).round() as SamplePosition
    }
}
