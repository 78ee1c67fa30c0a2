//! Builder for configuring and constructing a `ToidEngine`.

use crate::{Result, ToidEngine};
use toid_core::{SamplePosition, ToidConfig};

/// Every setting has a default matching [`ToidConfig::default`]; `build()`
/// validates the combination before anything is allocated.
///
/// # Example
///
/// ```ignore
/// use toid::prelude::*;
///
/// let engine = ToidEngine::builder()
///     .sample_rate(48000)
///     .tick(12000)
///     .build()?;
///
/// engine.player().set_track_from_notation("main", "12345 643 2 1")?;
/// engine.start()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ToidEngineBuilder {
    config: ToidConfig,
    output_device: Option<usize>,
}

impl ToidEngineBuilder {
    /// Default: 44100
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.config.sample_rate = sample_rate;
        self
    }

    /// Frames per block for the manual pump and offline export. Default: 512
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.config.block_size = block_size;
        self
    }

    /// Frames per notation token. Default: 11025
    pub fn tick(mut self, tick: SamplePosition) -> Self {
        self.config.tick = tick;
        self
    }

    pub fn config(mut self, config: ToidConfig) -> Self {
        self.config = config;
        self
    }

    /// Output device index as listed by `ToidEngine::list_output_devices`.
    /// Default: the host's default output.
    pub fn output_device(mut self, index: usize) -> Self {
        self.output_device = Some(index);
        self
    }

    pub fn build(self) -> Result<ToidEngine> {
        self.config.validate()?;
        ToidEngine::from_parts(self.config, self.output_device)
    }
}
