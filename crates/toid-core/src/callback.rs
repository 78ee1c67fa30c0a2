//! Handoff between a wave reader and whatever pulls blocks from it.

use crate::event::SamplePosition;
use crate::render::{MasterVolume, RenderStats, WaveReader};
use crate::Result;
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared handle to a [`WaveReader`].
///
/// The real-time side only ever uses [`render_rt`](Self::render_rt), which
/// never waits: if the control side is holding the reader (e.g. seeking),
/// the block is silence. The control side uses [`with`](Self::with).
#[derive(Clone)]
pub struct ReaderHandle {
    reader: Arc<Mutex<WaveReader>>,
    stats: Arc<RenderStats>,
    volume: Arc<MasterVolume>,
}

impl ReaderHandle {
    pub fn new(reader: WaveReader) -> Self {
        let stats = Arc::clone(reader.stats());
        let volume = Arc::clone(reader.volume());
        Self {
            reader: Arc::new(Mutex::new(reader)),
            stats,
            volume,
        }
    }

    /// Fill `output` with mono frames without blocking.
    #[inline]
    pub fn render_rt(&self, output: &mut [f32]) {
        match self.reader.try_lock() {
            Some(mut reader) => reader.next_block_into(output),
            None => output.fill(0.0),
        }
    }

    /// Fill `output` with interleaved stereo frames without blocking.
    #[inline]
    pub fn render_stereo_rt(&self, output: &mut [f32]) {
        match self.reader.try_lock() {
            Some(mut reader) => reader.next_stereo_block_into(output),
            None => output.fill(0.0),
        }
    }

    /// Run `f` with exclusive access to the reader (control side, blocking).
    pub fn with<R>(&self, f: impl FnOnce(&mut WaveReader) -> R) -> R {
        f(&mut self.reader.lock())
    }

    /// Wait until no render call is in progress.
    pub fn quiesce(&self) {
        drop(self.reader.lock());
    }

    pub fn position(&self) -> SamplePosition {
        self.with(|reader| reader.position())
    }

    pub fn stats(&self) -> &Arc<RenderStats> {
        &self.stats
    }

    /// Master volume. Does not touch the reader lock.
    pub fn volume(&self) -> f32 {
        self.volume.get()
    }

    pub fn set_volume(&self, volume: f32) -> Result<()> {
        self.volume.set(volume)
    }
}

/// Manual outputter: pulls fixed-size blocks on demand.
///
/// Used for offline rendering and tests, where there is no device clock.
pub struct BlockPump {
    reader: ReaderHandle,
    block: Vec<f32>,
    stereo: bool,
}

impl BlockPump {
    /// Mono blocks of `block_size` frames.
    pub fn new(reader: ReaderHandle, block_size: usize) -> Self {
        Self {
            reader,
            block: vec![0.0; block_size.max(1)],
            stereo: false,
        }
    }

    /// Interleaved stereo blocks of `block_size` frames.
    pub fn stereo(reader: ReaderHandle, block_size: usize) -> Self {
        Self {
            reader,
            block: vec![0.0; block_size.max(1) * 2],
            stereo: true,
        }
    }

    /// Frames per block.
    pub fn block_size(&self) -> usize {
        self.block.len() / self.channels()
    }

    pub fn channels(&self) -> usize {
        if self.stereo {
            2
        } else {
            1
        }
    }

    pub fn reader(&self) -> &ReaderHandle {
        &self.reader
    }

    /// Render the next block.
    pub fn pump(&mut self) -> &[f32] {
        let block = &mut self.block;
        if self.stereo {
            self.reader.with(|reader| reader.next_stereo_block_into(block));
        } else {
            self.reader.with(|reader| reader.next_block_into(block));
        }
        &self.block
    }

    /// Render whole blocks until at least `frames` frames have been produced,
    /// handing each block to `sink`. Returns the number of frames rendered.
    pub fn run(&mut self, frames: SamplePosition, mut sink: impl FnMut(&[f32])) -> SamplePosition {
        let size = self.block_size() as SamplePosition;
        let mut rendered = 0;
        while rendered < frames {
            sink(self.pump());
            rendered += size;
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::NoInstruments;
    use crate::store::{Action, MusicStore, Reducer};

    fn handle() -> (Reducer, ReaderHandle) {
        let store = Arc::new(MusicStore::new());
        let reader = WaveReader::new(Arc::clone(&store), Arc::new(NoInstruments), 44100);
        (Reducer::new(store), ReaderHandle::new(reader))
    }

    #[test]
    fn test_render_rt_is_silent_while_locked() {
        let (reducer, handle) = handle();
        reducer.apply(Action::note_on("main", 69.0, 0)).unwrap();

        let mut block = vec![1.0; 64];
        handle.with(|_reader| {
            handle.render_rt(&mut block);
        });
        assert!(block.iter().all(|&s| s == 0.0));
        assert_eq!(handle.position(), 0);

        handle.render_rt(&mut block);
        assert!(block.iter().any(|&s| s != 0.0));
        assert_eq!(handle.position(), 64);
    }

    #[test]
    fn test_block_pump_runs_whole_blocks() {
        let (_reducer, handle) = handle();
        let mut pump = BlockPump::new(handle.clone(), 100);

        let mut blocks = 0;
        let rendered = pump.run(250, |block| {
            assert_eq!(block.len(), 100);
            blocks += 1;
        });
        assert_eq!(blocks, 3);
        assert_eq!(rendered, 300);
        assert_eq!(handle.position(), 300);
        assert_eq!(handle.stats().blocks(), 3);
    }

    #[test]
    fn test_stereo_pump() {
        let (reducer, handle) = handle();
        reducer.apply(Action::note_on("main", 69.0, 0)).unwrap();
        let mut pump = BlockPump::stereo(handle.clone(), 64);
        assert_eq!(pump.block_size(), 64);
        assert_eq!(pump.channels(), 2);

        let block = pump.pump().to_vec();
        assert_eq!(block.len(), 128);
        assert!(block.chunks(2).all(|frame| frame[0] == frame[1]));
        assert_eq!(handle.position(), 64);
    }

    #[test]
    fn test_volume_is_shared_with_reader() {
        let (reducer, handle) = handle();
        reducer.apply(Action::note_on("main", 69.0, 0)).unwrap();
        handle.set_volume(0.0).unwrap();
        assert_eq!(handle.with(|reader| reader.volume().get()), 0.0);

        let mut block = vec![1.0; 32];
        handle.render_stereo_rt(&mut block);
        assert!(block.iter().all(|&s| s == 0.0));
        assert!(handle.set_volume(-1.0).is_err());
    }
}
