//! Loaded instruments: decoded WAV samples and oscillators.

use crate::catalog::{InstrumentKind, InstrumentSpec};
use crate::{Error, Result};
use hound::{SampleFormat, WavReader};
use std::io::Read;
use std::path::Path;
use toid_core::{Instrument, Pitch, SamplePosition, SineInstrument};

/// Mono sample data normalized to ±1.0.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Decode a WAV file, averaging all channels down to mono.
    pub fn from_wav_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_wav(WavReader::open(path)?)
    }

    pub fn from_wav<R: Read>(mut reader: WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        let channels = usize::from(spec.channels.max(1));

        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<_, _>>()?,
            SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        let samples = interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        Ok(Self::new(samples, spec.sample_rate))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Linearly interpolated value at fractional frame `position`.
    /// Past the end the value is 0, or wraps around when `looped`.
    #[inline]
    fn at(&self, position: f64, looped: bool) -> f32 {
        let len = self.samples.len();
        if len == 0 {
            return 0.0;
        }

        let position = if looped {
            position % len as f64
        } else {
            position
        };
        let index = position as usize;
        if index >= len {
            return 0.0;
        }
        let frac = (position - index as f64) as f32;

        let current = self.samples[index];
        let next = match self.samples.get(index + 1) {
            Some(&next) => next,
            None if looped => self.samples[0],
            None => 0.0,
        };
        current + (next - current) * frac
    }
}

#[derive(Debug, Clone)]
enum Source {
    Sample {
        buffer: SampleBuffer,
        /// Source frames advanced per output frame at the root pitch.
        rate_ratio: f64,
    },
    Sine(SineInstrument),
}

/// An instrument built from a catalog entry, ready for lookups.
#[derive(Debug, Clone)]
pub struct LoadedInstrument {
    source: Source,
    root_pitch: Pitch,
    low_pitch: Pitch,
    high_pitch: Pitch,
    looped: bool,
    gain: f32,
}

impl LoadedInstrument {
    /// Build the instrument `spec` describes. Decodes the sample, if any.
    pub fn from_spec(catalog: &str, spec: &InstrumentSpec, output_rate: u32) -> Result<Self> {
        let source = match spec.kind {
            InstrumentKind::Sine => Source::Sine(SineInstrument::new(output_rate)),
            InstrumentKind::Wav => {
                let path = spec.path.as_deref().ok_or_else(|| Error::Catalog {
                    catalog: catalog.to_string(),
                    reason: "wav instrument without a path".into(),
                })?;
                let buffer = SampleBuffer::from_wav_file(path)?;
                Source::Sample {
                    rate_ratio: buffer.sample_rate() as f64 / output_rate.max(1) as f64,
                    buffer,
                }
            }
        };

        Ok(Self {
            source,
            root_pitch: spec.root_pitch,
            low_pitch: spec.low_pitch,
            high_pitch: spec.high_pitch,
            looped: spec.looped,
            gain: spec.gain,
        })
    }

    /// Sample-based instrument from an in-memory buffer, playable at any pitch.
    pub fn from_buffer(buffer: SampleBuffer, root_pitch: Pitch, output_rate: u32) -> Self {
        Self {
            source: Source::Sample {
                rate_ratio: buffer.sample_rate() as f64 / output_rate.max(1) as f64,
                buffer,
            },
            root_pitch,
            low_pitch: f32::NEG_INFINITY,
            high_pitch: f32::INFINITY,
            looped: false,
            gain: 1.0,
        }
    }

    pub fn with_range(mut self, low: Pitch, high: Pitch) -> Self {
        self.low_pitch = low;
        self.high_pitch = high;
        self
    }

    pub fn with_looping(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }
}

impl Instrument for LoadedInstrument {
    fn lookup(&self, pitch: Pitch, frame_offset: SamplePosition) -> Option<f32> {
        if !(self.low_pitch..=self.high_pitch).contains(&pitch) {
            return None;
        }

        let value = match &self.source {
            Source::Sine(sine) => sine.lookup(pitch, frame_offset)?,
            Source::Sample { buffer, rate_ratio } => {
                let step = rate_ratio * 2f64.powf(f64::from(pitch - self.root_pitch) / 12.0);
                buffer.at(frame_offset as f64 * step, self.looped)
            }
        };
        Some(value * self.gain)
    }
}
