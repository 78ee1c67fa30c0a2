//! # toid - Live-coding Sequencer Engine
//!
//! Melody strings and note events in, a continuous waveform out.
//!
//! ## Architecture
//!
//! toid is an umbrella crate that coordinates:
//! - **toid-core** - Note event store, reducer, wave reader, device output
//! - **toid-notation** - Numeric melody notation parser
//! - **toid-sampler** - Instrument catalogs and WAV-sample instruments
//! - **toid-export** - Offline rendering to WAV
//!
//! and adds the control front-ends: [`Player`], with a local implementation
//! and a remote one that speaks JSON over any text transport.
//!
//! ## Quick Start
//!
//! ```ignore
//! use toid::prelude::*;
//!
//! let engine = ToidEngine::builder().build()?;
//! let player = engine.player();
//!
//! player.set_track_from_notation("main", "12345 643 2 1")?;
//! player.set_track_from_notation_with_octave("sub", "1   5   ", -1.0)?;
//!
//! engine.start()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - `audio-io` and `export`
//! - `audio-io` - Device output through CPAL
//! - `export` - Offline rendering to WAV

/// Re-export of toid-core for direct access
pub use toid_core as core;

// Core types
pub use toid_core::{
    Action, BlockPump, Instrument, InstrumentMap, InstrumentProvider, MasterVolume, MusicStore,
    NoInstruments, NoteEvent, NoteEventKind, Pitch, ReaderHandle, Reducer, RenderMetrics,
    RenderStats, SamplePosition, SineInstrument, Snapshot, StoreVersion, ToidConfig, Track,
    TrackPolicy, WaveReader, DEFAULT_BLOCK_SIZE, DEFAULT_SAMPLE_RATE, DEFAULT_TICK,
};

#[cfg(feature = "audio-io")]
pub use toid_core::AudioOutputter;

// Notation
pub use toid_notation as notation;
pub use toid_notation::{NotationParser, NoteBatch, NoteSpec};

// Instrument resources
pub use toid_sampler as sampler;
pub use toid_sampler::{Catalog, LoadedInstrument, ResourceManager};

// Export
#[cfg(feature = "export")]
pub use toid_export as export;

#[cfg(feature = "export")]
pub use toid_export::{BitDepth, ExportSummary, WavConfig, WavExporter};

mod error;
pub use error::{Error, Result};

mod builder;
mod engine;
pub mod player;
pub mod remote;

pub use builder::ToidEngineBuilder;
pub use engine::ToidEngine;
pub use player::{LocalPlayer, Player};
pub use remote::{MessageSink, RemoteMessage, RemotePlayer, RemoteServer};

/// Convenience prelude for common imports
pub mod prelude {
    // Main engine
    pub use crate::{ToidEngine, ToidEngineBuilder};

    // Players
    pub use crate::{LocalPlayer, Player, RemotePlayer, RemoteServer};

    // Essential types
    pub use crate::core::{Action, NoteEvent, Pitch, SamplePosition, Snapshot};

    pub use crate::{Error, Result};

    pub use std::path::Path;
    pub use std::sync::Arc;
}
