//! ToidEngine that wires the store, renderer and outputters together

use crate::player::LocalPlayer;
use crate::Result;
use std::sync::Arc;
use toid_core::{
    BlockPump, MusicStore, ReaderHandle, Reducer, RenderMetrics, SamplePosition, StoreVersion,
    ToidConfig, WaveReader,
};
use toid_notation::NotationParser;
use toid_sampler::ResourceManager;

#[cfg(feature = "audio-io")]
use parking_lot::Mutex;
#[cfg(feature = "audio-io")]
use toid_core::AudioOutputter;

#[cfg(feature = "export")]
use std::path::Path;
#[cfg(feature = "export")]
use toid_export::{BitDepth, ExportSummary, WavConfig, WavExporter};

/// Main sequencer engine.
///
/// Owns one note store and everything attached to it:
/// - a [`Reducer`], the single writer
/// - a [`ResourceManager`] serving instruments to the renderer
/// - a [`ReaderHandle`] around the wave reader
/// - the device outputter (feature "audio-io")
///
/// Control code goes through [`player`](Self::player); audio leaves through
/// [`start`](Self::start), [`pump`](Self::pump) or `export_wav`.
///
/// # Example
///
/// ```ignore
/// use toid::prelude::*;
///
/// let engine = ToidEngine::builder().build()?;
/// let player = engine.player();
///
/// player.register_resource(Path::new("assets/catalog.toml"))?;
/// player.load_instrument("sf2.piano")?;
/// player.set_instrument(Some("sf2.piano"))?;
/// player.loop_notation("12345 643 2 1", 0.0, "main")?;
///
/// engine.start()?;
/// ```
pub struct ToidEngine {
    config: ToidConfig,
    reducer: Arc<Reducer>,
    resources: Arc<ResourceManager>,
    parser: NotationParser,
    reader: ReaderHandle,

    #[cfg(feature = "audio-io")]
    output: Mutex<AudioOutputter>,
}

impl ToidEngine {
    /// Create a new engine builder
    pub fn builder() -> crate::ToidEngineBuilder {
        crate::ToidEngineBuilder::default()
    }

    #[cfg_attr(not(feature = "audio-io"), allow(unused_variables))]
    pub(crate) fn from_parts(config: ToidConfig, output_device: Option<usize>) -> Result<Self> {
        let parser = NotationParser::new(config.tick)?;
        let store = Arc::new(MusicStore::new());
        let reducer = Arc::new(Reducer::new(Arc::clone(&store)));
        let resources = Arc::new(ResourceManager::new(config.sample_rate));

        let reader = ReaderHandle::new(WaveReader::new(
            store,
            Arc::clone(&resources) as _,
            config.sample_rate,
        ));

        #[cfg(feature = "audio-io")]
        let output = Mutex::new(
            AudioOutputter::new(reader.clone(), config.sample_rate).with_device(output_device),
        );

        Ok(Self {
            config,
            reducer,
            resources,
            parser,
            reader,
            #[cfg(feature = "audio-io")]
            output,
        })
    }

    pub fn config(&self) -> &ToidConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// A player writing into this engine's store.
    pub fn player(&self) -> LocalPlayer {
        LocalPlayer::new(
            Arc::clone(&self.reducer),
            Arc::clone(&self.resources),
            self.parser,
        )
    }

    pub fn store(&self) -> &Arc<MusicStore> {
        self.reducer.store()
    }

    pub fn reducer(&self) -> &Arc<Reducer> {
        &self.reducer
    }

    pub fn resources(&self) -> &Arc<ResourceManager> {
        &self.resources
    }

    pub fn parser(&self) -> &NotationParser {
        &self.parser
    }

    pub fn reader(&self) -> &ReaderHandle {
        &self.reader
    }

    /// Latest published store version.
    pub fn latest(&self) -> Arc<StoreVersion> {
        self.store().latest()
    }

    /// Render counters since creation (or the last `reset`).
    pub fn stats(&self) -> RenderMetrics {
        self.reader.stats().metrics()
    }

    /// Current playback position in frames.
    pub fn position(&self) -> SamplePosition {
        self.reader.position()
    }

    /// Move playback to `position`. Waits for an in-flight device callback.
    pub fn seek(&self, position: SamplePosition) {
        self.reader.with(|reader| reader.seek(position));
    }

    /// Render the next `frames` mono frames without a device.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        self.reader.with(|reader| reader.next_block(frames))
    }

    /// Render the next `frames` frames as interleaved left/right pairs.
    pub fn render_stereo(&self, frames: usize) -> Vec<f32> {
        self.reader.with(|reader| reader.next_stereo_block(frames))
    }

    /// Master volume for device output, manual rendering and export alike.
    pub fn set_volume(&self, volume: f32) -> Result<()> {
        self.reader.set_volume(volume)?;
        Ok(())
    }

    pub fn volume(&self) -> f32 {
        self.reader.volume()
    }

    /// Manual outputter using the configured block size.
    pub fn pump(&self) -> BlockPump {
        BlockPump::new(self.reader.clone(), self.config.block_size)
    }

    /// Open the output device and start pulling blocks.
    #[cfg(feature = "audio-io")]
    pub fn start(&self) -> Result<()> {
        self.output.lock().start()?;
        Ok(())
    }

    /// Stop the device stream. Returns after the last callback has finished.
    #[cfg(feature = "audio-io")]
    pub fn stop(&self) {
        self.output.lock().stop();
    }

    #[cfg(feature = "audio-io")]
    pub fn is_running(&self) -> bool {
        self.output.lock().is_running()
    }

    /// List available output devices
    #[cfg(feature = "audio-io")]
    pub fn list_output_devices() -> Result<Vec<String>> {
        Ok(AudioOutputter::list_devices()?)
    }

    #[cfg(feature = "audio-io")]
    pub fn current_output_device_name(&self) -> Result<String> {
        Ok(self.output.lock().device_name()?)
    }

    /// Takes effect on the next `start`.
    #[cfg(feature = "audio-io")]
    pub fn set_output_device(&self, index: Option<usize>) -> &Self {
        self.output.lock().set_device(index);
        self
    }

    /// Render `seconds` from the current position into a 16-bit mono WAV.
    #[cfg(feature = "export")]
    pub fn export_wav(&self, path: impl AsRef<Path>, seconds: f64) -> Result<ExportSummary> {
        self.export_wav_with(
            WavConfig::mono(self.config.sample_rate, BitDepth::Int16),
            path,
            seconds,
        )
    }

    /// Render `seconds` from the current position with a custom encoding.
    /// `config.sample_rate` is replaced with the engine's rate.
    #[cfg(feature = "export")]
    pub fn export_wav_with(
        &self,
        config: WavConfig,
        path: impl AsRef<Path>,
        seconds: f64,
    ) -> Result<ExportSummary> {
        let config = WavConfig {
            sample_rate: self.config.sample_rate,
            ..config
        };
        let exporter = WavExporter::new(config).block_size(self.config.block_size);
        Ok(exporter.export(&self.reader, seconds, path)?)
    }
}
