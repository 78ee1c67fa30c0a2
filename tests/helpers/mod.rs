//! Test helpers and fixtures for toid integration tests
//!
//! Engines here never open an audio device; blocks are pulled manually with
//! `ToidEngine::render` or a `BlockPump`.
//!
//! Most tests select the [`PROBE`] instrument, whose output is a constant
//! derived from the pitch. That makes "which pitch is active at frame n"
//! directly readable from the rendered samples.

#![allow(dead_code)]

use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::{Path, PathBuf};
use toid::prelude::*;

/// Instrument name of the pitch probe.
pub const PROBE: &str = "probe.pitch";

/// Silence detection threshold (-80dB)
pub const SILENCE_THRESHOLD: f32 = 0.0001;

/// Install a tracing subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Create a basic test engine. Avoids hardware audio I/O for CI environments.
pub fn test_engine() -> ToidEngine {
    ToidEngine::builder()
        .build()
        .expect("Failed to create test engine")
}

/// Engine with a short tick, handy for notation tests.
pub fn test_engine_with_tick(tick: SamplePosition) -> ToidEngine {
    ToidEngine::builder()
        .tick(tick)
        .build()
        .expect("Failed to create test engine")
}

/// Sample value the probe produces for `pitch`.
pub fn probe_value(pitch: f32) -> f32 {
    pitch / 200.0
}

/// Load the pitch probe into `engine` and select it.
pub fn select_probe(engine: &ToidEngine) {
    engine
        .resources()
        .insert(PROBE, Arc::new(|pitch: f32, _offset: u64| Some(probe_value(pitch))));
    engine
        .player()
        .set_instrument(Some(PROBE))
        .expect("Failed to select probe");
}

pub fn probe_engine() -> ToidEngine {
    let engine = test_engine();
    select_probe(&engine);
    engine
}

pub fn probe_engine_with_tick(tick: SamplePosition) -> ToidEngine {
    let engine = test_engine_with_tick(tick);
    select_probe(&engine);
    engine
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0, f32::max)
}

/// Check if a signal is silent (all samples below threshold).
pub fn is_silent(samples: &[f32]) -> bool {
    peak(samples) < SILENCE_THRESHOLD
}

/// Assert every sample equals `expected` within `epsilon`.
pub fn assert_constant(samples: &[f32], expected: f32, epsilon: f32) {
    for (i, &sample) in samples.iter().enumerate() {
        assert!(
            (sample - expected).abs() <= epsilon,
            "frame {i}: expected {expected}, got {sample}"
        );
    }
}

/// Write a 16-bit mono sine WAV at `frequency`.
pub fn write_sine_wav(path: &Path, sample_rate: u32, frequency: f32, frames: usize) {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let value = (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.5;
        writer.write_sample((value * 32767.0) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

pub fn write_catalog(dir: &Path, text: &str) -> PathBuf {
    let path = dir.join("catalog.toml");
    std::fs::write(&path, text).unwrap();
    path
}
