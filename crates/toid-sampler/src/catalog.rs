//! TOML instrument catalogs.
//!
//! ```toml
//! name = "sf2"
//!
//! [instruments.piano]
//! kind = "wav"
//! path = "piano_c4.wav"   # relative to the catalog file
//! root_pitch = 60.0
//! low_pitch = 36.0
//! high_pitch = 96.0
//!
//! [instruments.test]
//! kind = "sine"
//! ```

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use toid_core::Pitch;

/// How an instrument produces its waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentKind {
    /// Pitch-shifted playback of a WAV sample.
    Wav,
    /// Built-in sine oscillator.
    Sine,
}

fn default_root_pitch() -> Pitch {
    60.0
}

fn default_gain() -> f32 {
    1.0
}

/// One `[instruments.<key>]` table as written in the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct InstrumentTable {
    kind: InstrumentKind,
    path: Option<String>,
    #[serde(default = "default_root_pitch")]
    root_pitch: Pitch,
    low_pitch: Option<Pitch>,
    high_pitch: Option<Pitch>,
    #[serde(default)]
    looped: bool,
    #[serde(default = "default_gain")]
    gain: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    name: String,
    #[serde(default)]
    instruments: BTreeMap<String, InstrumentTable>,
}

/// A validated catalog instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSpec {
    pub kind: InstrumentKind,
    /// Absolute location of the sample, for `Wav` instruments.
    pub path: Option<PathBuf>,
    /// Pitch the sample was recorded at.
    pub root_pitch: Pitch,
    /// Lowest playable pitch; lookups below it miss.
    pub low_pitch: Pitch,
    /// Highest playable pitch; lookups above it miss.
    pub high_pitch: Pitch,
    /// Repeat the sample instead of falling silent at its end.
    pub looped: bool,
    pub gain: f32,
}

impl InstrumentSpec {
    #[inline]
    pub fn covers(&self, pitch: Pitch) -> bool {
        (self.low_pitch..=self.high_pitch).contains(&pitch)
    }
}

/// A registered catalog: a name plus the instruments it provides.
#[derive(Debug, Clone)]
pub struct Catalog {
    name: String,
    source: PathBuf,
    instruments: BTreeMap<String, InstrumentSpec>,
}

impl Catalog {
    /// Read and validate a catalog file. Every referenced sample must exist.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&text, base, path)
    }

    /// Parse catalog text, resolving sample paths against `base`.
    pub fn from_str_in(text: &str, base: &Path) -> Result<Self> {
        Self::parse(text, base, base)
    }

    fn parse(text: &str, base: &Path, source: &Path) -> Result<Self> {
        let file: CatalogFile = toml::from_str(text)?;
        let catalog = file.name;

        if catalog.is_empty() || catalog.contains('.') {
            return Err(Error::Catalog {
                catalog,
                reason: "name must be non-empty and must not contain '.'".into(),
            });
        }

        let mut instruments = BTreeMap::new();
        for (key, table) in file.instruments {
            let spec = validate(&catalog, &key, table, base)?;
            instruments.insert(key, spec);
        }

        Ok(Self {
            name: catalog,
            source: source.to_path_buf(),
            instruments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File the catalog was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn instrument(&self, key: &str) -> Option<&InstrumentSpec> {
        self.instruments.get(key)
    }

    /// Instrument keys in name order.
    pub fn instrument_keys(&self) -> impl Iterator<Item = &str> {
        self.instruments.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

fn validate(catalog: &str, key: &str, table: InstrumentTable, base: &Path) -> Result<InstrumentSpec> {
    let invalid = |reason: String| Error::Catalog {
        catalog: catalog.to_string(),
        reason: format!("instrument '{key}': {reason}"),
    };

    let low_pitch = table.low_pitch.unwrap_or(f32::NEG_INFINITY);
    let high_pitch = table.high_pitch.unwrap_or(f32::INFINITY);
    if !table.root_pitch.is_finite() {
        return Err(invalid(format!("root_pitch must be finite, got {}", table.root_pitch)));
    }
    if low_pitch.is_nan() || high_pitch.is_nan() || low_pitch > high_pitch {
        return Err(invalid(format!(
            "empty pitch range {low_pitch}..={high_pitch}"
        )));
    }
    if !table.gain.is_finite() || table.gain < 0.0 {
        return Err(invalid(format!("gain must be finite and non-negative, got {}", table.gain)));
    }

    let path = match (table.kind, table.path) {
        (InstrumentKind::Wav, None) => {
            return Err(invalid("kind \"wav\" requires a path".into()));
        }
        (InstrumentKind::Wav, Some(relative)) => {
            let path = base.join(relative);
            if !path.is_file() {
                return Err(Error::MissingFile {
                    catalog: catalog.to_string(),
                    path,
                });
            }
            Some(path)
        }
        (InstrumentKind::Sine, path) => path.map(|p| base.join(p)),
    };

    Ok(InstrumentSpec {
        kind: table.kind,
        path,
        root_pitch: table.root_pitch,
        low_pitch,
        high_pitch,
        looped: table.looped,
        gain: table.gain,
    })
}
