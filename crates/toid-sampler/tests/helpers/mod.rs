//! Fixtures: WAV files and catalogs in a temporary directory.

use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::{Path, PathBuf};

/// Write a 16-bit WAV whose frames are `frames`, one value per channel.
pub fn write_wav(path: &Path, sample_rate: u32, channels: u16, frames: &[Vec<f32>]) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for frame in frames {
        assert_eq!(frame.len(), channels as usize);
        for &value in frame {
            writer
                .write_sample((value * 32768.0).clamp(-32768.0, 32767.0) as i16)
                .unwrap();
        }
    }
    writer.finalize().unwrap();
}

/// Write a 32-bit float mono WAV.
pub fn write_float_wav(path: &Path, sample_rate: u32, samples: &[f32]) {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &value in samples {
        writer.write_sample(value).unwrap();
    }
    writer.finalize().unwrap();
}

pub fn write_catalog(dir: &Path, text: &str) -> PathBuf {
    let path = dir.join("catalog.toml");
    std::fs::write(&path, text).unwrap();
    path
}
