//! Instrument resources for the toid sequencer.
//!
//! - [`Catalog`]: a TOML file naming a set of instruments
//! - [`ResourceManager`]: registers catalogs, loads instruments and serves
//!   them to the renderer as an [`InstrumentProvider`](toid_core::InstrumentProvider)
//! - [`LoadedInstrument`]: pitch-shifted WAV sample or sine oscillator
//!
//! ```ignore
//! let resources = Arc::new(ResourceManager::new(44100));
//! resources.register("assets/catalog.toml")?;
//! resources.load("sf2.piano")?;
//! ```

pub mod error;
pub use error::{Error, Result};

mod catalog;
pub use catalog::{Catalog, InstrumentKind, InstrumentSpec};

mod instrument;
pub use instrument::{LoadedInstrument, SampleBuffer};

mod manager;
pub use manager::ResourceManager;
