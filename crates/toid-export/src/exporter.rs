//! Offline rendering of a reader into a WAV file.

use crate::error::{ExportError, Result};
use crate::wav::{write_block, WavConfig};
use hound::WavWriter;
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use toid_core::{BlockPump, ReaderHandle, SamplePosition, DEFAULT_BLOCK_SIZE};
use tracing::info;

/// What an export produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Frames written per channel. Always a whole number of blocks.
    pub frames: SamplePosition,
    pub blocks: u64,
}

/// Pulls fixed-size blocks from a reader and encodes them with hound.
///
/// The reader continues from its current position; seek it first to export
/// from the start.
#[derive(Debug, Clone)]
pub struct WavExporter {
    config: WavConfig,
    block_size: usize,
}

impl Default for WavExporter {
    fn default() -> Self {
        Self::new(WavConfig::default())
    }
}

impl WavExporter {
    pub fn new(config: WavConfig) -> Self {
        Self {
            config,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn config(&self) -> &WavConfig {
        &self.config
    }

    /// Frames covering `seconds`, rounded up to whole blocks.
    pub fn frames_for(&self, seconds: f64) -> SamplePosition {
        let frames = (seconds.max(0.0) * self.config.sample_rate as f64).round() as SamplePosition;
        let block = self.block_size.max(1) as SamplePosition;
        frames.div_ceil(block) * block
    }

    /// Render `seconds` of audio into a WAV file at `path`.
    pub fn export(
        &self,
        reader: &ReaderHandle,
        seconds: f64,
        path: impl AsRef<Path>,
    ) -> Result<ExportSummary> {
        let path = path.as_ref();
        self.validate(seconds)?;
        let writer = WavWriter::create(path, self.config.spec())?;
        let summary = self.render_into(writer, reader, seconds)?;
        info!(
            path = %path.display(),
            frames = summary.frames,
            channels = self.config.channels,
            "exported wav"
        );
        Ok(summary)
    }

    /// Render `seconds` of audio into in-memory WAV bytes.
    pub fn export_memory(&self, reader: &ReaderHandle, seconds: f64) -> Result<Vec<u8>> {
        self.validate(seconds)?;
        let mut buffer = Vec::new();
        let writer = WavWriter::new(Cursor::new(&mut buffer), self.config.spec())?;
        self.render_into(writer, reader, seconds)?;
        Ok(buffer)
    }

    fn validate(&self, seconds: f64) -> Result<()> {
        self.config.validate()?;
        if self.block_size == 0 {
            return Err(ExportError::InvalidOptions(
                "block size must be at least 1 frame".into(),
            ));
        }
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(ExportError::InvalidOptions(format!(
                "duration must be finite and non-negative, got {seconds}"
            )));
        }
        Ok(())
    }

    fn render_into<W: Write + Seek>(
        &self,
        mut writer: WavWriter<W>,
        reader: &ReaderHandle,
        seconds: f64,
    ) -> Result<ExportSummary> {
        let target = self.frames_for(seconds);
        let mut pump = match self.config.render_channels() {
            2 => BlockPump::stereo(reader.clone(), self.block_size),
            _ => BlockPump::new(reader.clone(), self.block_size),
        };

        let mut blocks = 0;
        let mut failure = None;
        let frames = pump.run(target, |block| {
            if failure.is_none() {
                if let Err(e) = write_block(&mut writer, block, &self.config) {
                    failure = Some(e);
                }
            }
            blocks += 1;
        });
        if let Some(e) = failure {
            return Err(e);
        }

        writer.finalize()?;
        Ok(ExportSummary { frames, blocks })
    }
}
