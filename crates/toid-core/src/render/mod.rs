//! Rendering from the note store to sample blocks.

mod stats;
mod volume;
mod wave_reader;

pub use stats::{RenderMetrics, RenderStats};
pub use volume::MasterVolume;
pub use wave_reader::{pan_gains, WaveReader};
