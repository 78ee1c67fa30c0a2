//! Pull-based renderer from the note store to mono or stereo sample blocks.

use super::stats::RenderStats;
use super::volume::MasterVolume;
use crate::event::{NoteEvent, NoteEventKind, SamplePosition};
use crate::instrument::{Instrument, InstrumentProvider, SineInstrument};
use crate::store::{MusicStore, Track};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Left and right gains for a track pan in `-1.0..=1.0`.
///
/// Centre keeps both channels at full level, so a centred track sounds the
/// same in the stereo and the mono render. Panning attenuates the opposite
/// channel linearly.
#[inline]
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let pan = pan.clamp(-1.0, 1.0);
    (1.0 - pan.max(0.0), 1.0 + pan.min(0.0))
}

/// Renders the latest published store version block by block.
///
/// There is one logical reader per output: calls are sequential and the
/// cursor only moves forward (except through [`seek`](Self::seek)).
///
/// Each track plays through its own instrument when it names one, and
/// through the store-wide selection otherwise. With neither, the built-in
/// sine plays.
///
/// # RT Safety
/// `next_block_into` and `next_stereo_block_into` take no locks, do no I/O
/// and never return an error. The store version is loaded once per block
/// with a wait-free `ArcSwap` load, so a version published mid-block is
/// picked up at the next block.
pub struct WaveReader {
    store: Arc<MusicStore>,
    provider: Arc<dyn InstrumentProvider>,
    fallback: SineInstrument,
    position: SamplePosition,
    stats: Arc<RenderStats>,
    volume: Arc<MasterVolume>,
}

impl WaveReader {
    pub fn new(
        store: Arc<MusicStore>,
        provider: Arc<dyn InstrumentProvider>,
        sample_rate: u32,
    ) -> Self {
        Self {
            store,
            provider,
            fallback: SineInstrument::new(sample_rate),
            position: 0,
            stats: Arc::new(RenderStats::new()),
            volume: Arc::new(MasterVolume::new()),
        }
    }

    /// Frame position of the next sample to be rendered.
    #[inline]
    pub fn position(&self) -> SamplePosition {
        self.position
    }

    pub fn seek(&mut self, position: SamplePosition) {
        self.position = position;
    }

    pub fn stats(&self) -> &Arc<RenderStats> {
        &self.stats
    }

    pub fn volume(&self) -> &Arc<MasterVolume> {
        &self.volume
    }

    pub fn store(&self) -> &Arc<MusicStore> {
        &self.store
    }

    /// Render `frame_count` mono frames into a new buffer.
    pub fn next_block(&mut self, frame_count: usize) -> Vec<f32> {
        let mut block = vec![0.0; frame_count];
        self.next_block_into(&mut block);
        block
    }

    /// Render `frame_count` interleaved stereo frames into a new buffer.
    pub fn next_stereo_block(&mut self, frame_count: usize) -> Vec<f32> {
        let mut block = vec![0.0; frame_count * 2];
        self.next_stereo_block_into(&mut block);
        block
    }

    /// Render `output.len()` mono frames into `output` and advance the
    /// cursor by the same amount. Pan is ignored.
    pub fn next_block_into(&mut self, output: &mut [f32]) {
        self.fill(output, 1);
    }

    /// Render `output.len() / 2` interleaved left/right frames and advance
    /// the cursor by that many frames. An odd trailing sample is zeroed.
    pub fn next_stereo_block_into(&mut self, output: &mut [f32]) {
        self.fill(output, 2);
    }

    fn fill(&mut self, output: &mut [f32], channels: usize) {
        output.fill(0.0);
        let frames = output.len() / channels;
        let output = &mut output[..frames * channels];
        let start = self.position;

        let rendered = catch_unwind(AssertUnwindSafe(|| self.render(start, output, channels)));
        match rendered {
            Ok((version, misses)) => self.stats.record_block(frames, version, misses),
            Err(_) => {
                output.fill(0.0);
                self.stats.record_fault(frames);
            }
        }

        self.position = start.saturating_add(frames as SamplePosition);
    }

    /// Mix every track into `output`. Returns the version used and the
    /// number of missed lookups.
    fn render(&self, start: SamplePosition, output: &mut [f32], channels: usize) -> (u64, u64) {
        let version = self.store.load();
        let frames = output.len() / channels;

        let mut misses = 0;
        for (_, track) in version.tracks() {
            let loaded = track
                .instrument()
                .or(version.instrument())
                .map(|name| self.provider.instrument(name));
            let instrument: Option<&dyn Instrument> = match &loaded {
                None => Some(&self.fallback as &dyn Instrument),
                Some(found) => found.as_deref(),
            };

            misses += if channels == 2 {
                let (left, right) = pan_gains(track.pan());
                mix_track(track, instrument, start, frames, |i, value| {
                    output[2 * i] += value * left;
                    output[2 * i + 1] += value * right;
                })
            } else {
                mix_track(track, instrument, start, frames, |i, value| {
                    output[i] += value;
                })
            };
        }

        let volume = self.volume.get();
        for sample in output.iter_mut() {
            let scaled = *sample * volume;
            *sample = if scaled.is_finite() {
                scaled.clamp(-1.0, 1.0)
            } else {
                0.0
            };
        }

        (version.version(), misses)
    }
}

/// Feed one track's contribution for frames `[start, start + frames)` to
/// `emit`, which receives the frame index and the gained value.
fn mix_track(
    track: &Track,
    instrument: Option<&dyn Instrument>,
    start: SamplePosition,
    frames: usize,
    mut emit: impl FnMut(usize, f32),
) -> u64 {
    let events = track.reachable_events();
    if events.is_empty() {
        return 0;
    }
    let gain = track.gain();

    match track.loop_length() {
        None => mix_segment(events, instrument, gain, start, 0..frames, &mut emit),
        Some(length) => {
            let mut misses = 0;
            let mut local = start % length;
            let mut done = 0;
            while done < frames {
                let take = ((length - local) as usize).min(frames - done);
                let range = done..done + take;
                misses += mix_segment(events, instrument, gain, local, range, &mut emit);
                done += take;
                local = 0;
            }
            misses
        }
    }
}

/// Mix the output frames in `range`, whose first frame sits at track-local
/// position `local`.
fn mix_segment(
    events: &[NoteEvent],
    instrument: Option<&dyn Instrument>,
    gain: f32,
    local: SamplePosition,
    range: std::ops::Range<usize>,
    emit: &mut impl FnMut(usize, f32),
) -> u64 {
    let mut misses = 0;
    // Index of the first event that is still in the future.
    let mut next = events.partition_point(|e| e.at <= local);

    for (i, frame) in range.enumerate() {
        let position = local + i as SamplePosition;
        while next < events.len() && events[next].at <= position {
            next += 1;
        }
        let Some(active) = next.checked_sub(1).map(|idx| &events[idx]) else {
            continue;
        };
        let NoteEventKind::On { pitch } = active.kind else {
            continue;
        };

        match instrument.and_then(|inst| inst.lookup(pitch, position - active.at)) {
            Some(value) if value.is_finite() => emit(frame, value * gain),
            _ => misses += 1,
        }
    }
    misses
}
