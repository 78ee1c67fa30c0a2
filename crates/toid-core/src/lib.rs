//! Core sequencing kernel: note event store, reducer, wave reader and audio output.
//!
//! # Primary API
//!
//! - [`Reducer`] / [`MusicStore`]: apply [`Action`]s and publish immutable
//!   [`StoreVersion`]s
//! - [`WaveReader`]: render the latest version into mono or stereo sample
//!   blocks, scaled by a [`MasterVolume`]
//! - [`ReaderHandle`] / [`BlockPump`]: hand a reader to an outputter
//! - [`Instrument`] / [`InstrumentProvider`]: the read side of instrument banks
//!
//! # Feature-gated APIs
//!
//! - `"audio-io"`: [`AudioOutputter`], CPAL device output (enabled by default)
//!
//! # Example
//!
//! ```ignore
//! use toid_core::prelude::*;
//!
//! let store = Arc::new(MusicStore::new());
//! let reducer = Reducer::new(Arc::clone(&store));
//! reducer.apply(Action::note_on("main", 60.0, 0))?;
//!
//! let mut reader = WaveReader::new(store, Arc::new(NoInstruments), 44100);
//! let block = reader.next_block(512);
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::{ToidConfig, DEFAULT_BLOCK_SIZE, DEFAULT_SAMPLE_RATE, DEFAULT_TICK};

mod event;
pub use event::{NoteEvent, NoteEventKind, Pitch, SamplePosition};

pub mod store;
pub use store::{
    reduce, Action, MusicStore, Reducer, Snapshot, StoreVersion, Track, TrackPolicy,
};

mod instrument;
pub use instrument::{
    pitch_to_hz, Instrument, InstrumentMap, InstrumentProvider, NoInstruments, SineInstrument,
    A4_FREQ, A4_PITCH, DEFAULT_SINE_AMPLITUDE,
};

mod render;
pub use render::{pan_gains, MasterVolume, RenderMetrics, RenderStats, WaveReader};

mod reclaim;
pub use reclaim::Retired;

mod callback;
pub use callback::{BlockPump, ReaderHandle};

#[cfg(feature = "audio-io")]
mod output;
#[cfg(feature = "audio-io")]
pub use output::AudioOutputter;

pub mod prelude {
    pub use crate::{
        Action, BlockPump, Error, Instrument, InstrumentProvider, MasterVolume, MusicStore,
        NoInstruments, NoteEvent, Pitch, ReaderHandle, Reducer, Result, SamplePosition,
        StoreVersion, ToidConfig, WaveReader,
    };
    pub use std::sync::Arc;

    #[cfg(feature = "audio-io")]
    pub use crate::AudioOutputter;
}
