//! Read interface to instrument resources.
//!
//! The core never loads or owns sample data. It asks an
//! [`InstrumentProvider`] for the instrument selected in the store and calls
//! [`Instrument::lookup`] for every sounding frame. A `None` from either is a
//! miss and renders as silence.

use crate::event::{Pitch, SamplePosition};
use std::collections::HashMap;
use std::sync::Arc;

/// Reference pitch for A4.
pub const A4_FREQ: f32 = 440.0;

/// Pitch number for A4.
pub const A4_PITCH: f32 = 69.0;

/// Peak level of the built-in oscillator (15000 / i16::MAX).
pub const DEFAULT_SINE_AMPLITUDE: f32 = 15_000.0 / 32_767.0;

/// Convert a semitone pitch to Hz (12-TET, A4 = 440 Hz).
#[inline]
pub fn pitch_to_hz(pitch: Pitch) -> f32 {
    A4_FREQ * 2.0_f32.powf((pitch - A4_PITCH) / 12.0)
}

/// Waveform source for one instrument.
///
/// Called from the audio thread: implementations must not block, allocate
/// or do I/O.
pub trait Instrument: Send + Sync {
    /// Sample value of `pitch`, `frame_offset` frames after its onset.
    /// `None` when the pitch is outside the instrument's range.
    fn lookup(&self, pitch: Pitch, frame_offset: SamplePosition) -> Option<f32>;
}

impl<F> Instrument for F
where
    F: Fn(Pitch, SamplePosition) -> Option<f32> + Send + Sync,
{
    #[inline]
    fn lookup(&self, pitch: Pitch, frame_offset: SamplePosition) -> Option<f32> {
        self(pitch, frame_offset)
    }
}

/// Resolves instrument names to loaded instruments.
pub trait InstrumentProvider: Send + Sync {
    /// RT-safe. `None` if the instrument is unknown or not loaded yet.
    fn instrument(&self, name: &str) -> Option<Arc<dyn Instrument>>;
}

/// Provider with nothing loaded. Every named lookup misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInstruments;

impl InstrumentProvider for NoInstruments {
    fn instrument(&self, _name: &str) -> Option<Arc<dyn Instrument>> {
        None
    }
}

/// Fixed name → instrument map, built up front.
#[derive(Default, Clone)]
pub struct InstrumentMap {
    instruments: HashMap<String, Arc<dyn Instrument>>,
}

impl InstrumentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, instrument: Arc<dyn Instrument>) -> Self {
        self.instruments.insert(name.into(), instrument);
        self
    }
}

impl InstrumentProvider for InstrumentMap {
    fn instrument(&self, name: &str) -> Option<Arc<dyn Instrument>> {
        self.instruments.get(name).cloned()
    }
}

/// Built-in sine oscillator, used when no instrument is selected.
#[derive(Debug, Clone, Copy)]
pub struct SineInstrument {
    sample_rate: f64,
    amplitude: f32,
}

impl SineInstrument {
    pub fn new(sample_rate: u32) -> Self {
        Self::with_amplitude(sample_rate, DEFAULT_SINE_AMPLITUDE)
    }

    pub fn with_amplitude(sample_rate: u32, amplitude: f32) -> Self {
        Self {
            sample_rate: sample_rate as f64,
            amplitude,
        }
    }
}

impl Instrument for SineInstrument {
    #[inline]
    fn lookup(&self, pitch: Pitch, frame_offset: SamplePosition) -> Option<f32> {
        // Phase is reduced in f64 so long notes do not lose precision.
        let cycles = frame_offset as f64 * pitch_to_hz(pitch) as f64 / self.sample_rate;
        let phase = cycles.fract() * core::f64::consts::TAU;
        Some(phase.sin() as f32 * self.amplitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pitch_to_hz() {
        assert_relative_eq!(pitch_to_hz(69.0), 440.0);
        assert_relative_eq!(pitch_to_hz(81.0), 880.0, epsilon = 1e-3);
        assert_relative_eq!(pitch_to_hz(60.0), 261.6256, epsilon = 1e-3);
    }

    #[test]
    fn test_sine_instrument_matches_reference() {
        let sine = SineInstrument::with_amplitude(44100, 1.0);
        let true_wave = [
            0., 0.06268834, 0.12537667, 0.188065, 0.25075334, 0.3134417, 0.37613, 0.43881837,
            0.5015067, 0.56419504,
        ];
        for (i, &expected) in true_wave.iter().enumerate() {
            let value = sine.lookup(69.0, i as u64).unwrap();
            assert!((value - expected).abs() < 0.03, "frame {i}: {value}");
        }
    }

    #[test]
    fn test_sine_amplitude_bound() {
        let sine = SineInstrument::new(44100);
        let peak = (0..44100)
            .map(|i| sine.lookup(60.0, i).unwrap().abs())
            .fold(0.0f32, f32::max);
        assert!(peak <= DEFAULT_SINE_AMPLITUDE + 1e-6);
        assert!(peak > DEFAULT_SINE_AMPLITUDE * 0.99);
    }

    #[test]
    fn test_providers() {
        assert!(NoInstruments.instrument("anything").is_none());

        let map = InstrumentMap::new().with(
            "flat",
            Arc::new(|_pitch: f32, _offset: u64| -> Option<f32> { Some(0.5) }) as Arc<dyn Instrument>,
        );
        let flat = map.instrument("flat").unwrap();
        assert_eq!(flat.lookup(60.0, 0), Some(0.5));
        assert!(map.instrument("missing").is_none());
    }
}
