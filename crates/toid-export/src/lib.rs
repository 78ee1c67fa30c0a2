//! Offline rendering and WAV export for the toid sequencer.
//!
//! Drives a [`ReaderHandle`](toid_core::ReaderHandle) in fixed blocks and
//! writes the result with hound, in place of a device outputter.
//!
//! ```ignore
//! use toid_export::{BitDepth, WavConfig, WavExporter};
//!
//! let exporter = WavExporter::new(WavConfig::stereo(44100, BitDepth::Int16));
//! exporter.export(&reader, 4.0, "melody.wav")?;
//! ```

mod error;
mod exporter;
mod wav;

pub use error::{ExportError, Result};
pub use exporter::{ExportSummary, WavExporter};
pub use wav::{BitDepth, WavConfig};
