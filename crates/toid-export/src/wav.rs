//! WAV encoding using hound
//!
//! Mono files take the mono render. Files with two or more channels take the
//! stereo render on the first two and silence on the rest. Samples are
//! 16-bit, 24-bit or 32-bit float.

use crate::error::{ExportError, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::{Seek, Write};

/// Sample encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepth {
    #[default]
    Int16,
    Int24,
    Float32,
}

impl BitDepth {
    /// Bits per sample.
    pub fn bits(&self) -> u16 {
        match self {
            BitDepth::Int16 => 16,
            BitDepth::Int24 => 24,
            BitDepth::Float32 => 32,
        }
    }
}

/// WAV encoder configuration
#[derive(Debug, Clone, PartialEq)]
pub struct WavConfig {
    /// Sample rate in Hz; must match the rate the reader renders at
    pub sample_rate: u32,
    pub bit_depth: BitDepth,
    /// 1 for the mono mix, 2 or more for the panned stereo mix
    pub channels: u16,
}

impl Default for WavConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            bit_depth: BitDepth::Int16,
            channels: 1,
        }
    }
}

impl WavConfig {
    pub fn mono(sample_rate: u32, bit_depth: BitDepth) -> Self {
        Self {
            sample_rate,
            bit_depth,
            channels: 1,
        }
    }

    pub fn stereo(sample_rate: u32, bit_depth: BitDepth) -> Self {
        Self {
            sample_rate,
            bit_depth,
            channels: 2,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(ExportError::InvalidOptions(
                "channel count must be at least 1".into(),
            ));
        }
        if self.sample_rate == 0 {
            return Err(ExportError::InvalidOptions(
                "sample rate must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Channels the reader has to render for this file: 1 or 2.
    pub(crate) fn render_channels(&self) -> usize {
        if self.channels >= 2 {
            2
        } else {
            1
        }
    }

    pub(crate) fn spec(&self) -> WavSpec {
        WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bit_depth.bits(),
            sample_format: match self.bit_depth {
                BitDepth::Float32 => SampleFormat::Float,
                _ => SampleFormat::Int,
            },
        }
    }
}

/// Write a rendered block, laid out as [`WavConfig::render_channels`]
/// interleaved channels, padding extra file channels with silence.
pub(crate) fn write_block<W: Write + Seek>(
    writer: &mut WavWriter<W>,
    block: &[f32],
    config: &WavConfig,
) -> Result<()> {
    let source = config.render_channels();
    for frame in block.chunks_exact(source) {
        for ch in 0..usize::from(config.channels) {
            let sample = frame.get(ch).copied().unwrap_or(0.0);
            match config.bit_depth {
                BitDepth::Int16 => writer.write_sample(float_to_i16(sample))?,
                BitDepth::Int24 => writer.write_sample(float_to_i24(sample))?,
                BitDepth::Float32 => writer.write_sample(sample)?,
            }
        }
    }
    Ok(())
}

/// Convert float sample to 16-bit integer with clipping
#[inline]
fn float_to_i16(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    (clamped * 32767.0) as i16
}

/// Convert float sample to 24-bit integer (stored as i32) with clipping
#[inline]
fn float_to_i24(sample: f32) -> i32 {
    let clamped = sample.clamp(-1.0, 1.0);
    (clamped * 8388607.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_config_default() {
        let config = WavConfig::default();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.channels, 1);
        assert_eq!(config.spec().bits_per_sample, 16);
    }

    #[test]
    fn test_wav_config_validate() {
        assert!(WavConfig::stereo(48000, BitDepth::Int24).validate().is_ok());
        assert!(WavConfig {
            channels: 0,
            ..WavConfig::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_float_to_i16() {
        assert_eq!(float_to_i16(0.0), 0);
        assert_eq!(float_to_i16(1.0), 32767);
        assert_eq!(float_to_i16(-1.0), -32767);
        assert_eq!(float_to_i16(1.5), 32767);
    }

    #[test]
    fn test_float_to_i24() {
        assert_eq!(float_to_i24(0.0), 0);
        assert_eq!(float_to_i24(1.0), 8388607);
        assert_eq!(float_to_i24(-1.0), -8388607);
    }

    fn encode(config: &WavConfig, block: &[f32]) -> Vec<f32> {
        let mut buffer = Vec::new();
        {
            let cursor = std::io::Cursor::new(&mut buffer);
            let mut writer = WavWriter::new(cursor, config.spec()).unwrap();
            write_block(&mut writer, block, config).unwrap();
            writer.finalize().unwrap();
        }

        let reader = hound::WavReader::new(std::io::Cursor::new(buffer)).unwrap();
        reader.into_samples::<f32>().map(|s| s.unwrap()).collect()
    }

    #[test]
    fn test_write_block_layouts() {
        let stereo = [0.5, -0.25, 1.0, 0.0];
        assert_eq!(
            encode(&WavConfig::stereo(44100, BitDepth::Float32), &stereo),
            stereo.to_vec()
        );

        let quad = WavConfig {
            channels: 4,
            ..WavConfig::stereo(44100, BitDepth::Float32)
        };
        assert_eq!(
            encode(&quad, &stereo),
            vec![0.5, -0.25, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]
        );

        let mono = WavConfig::mono(44100, BitDepth::Float32);
        assert_eq!(encode(&mono, &[0.5, -0.25]), vec![0.5, -0.25]);
    }
}
