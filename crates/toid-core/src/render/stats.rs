//! Render-side counters, readable from the control side.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderMetrics {
    pub blocks: u64,
    pub frames: u64,
    /// Frames where a sounding note had no waveform value.
    pub missed_lookups: u64,
    /// Blocks zeroed after a panic during rendering.
    pub faults: u64,
    /// Store version used by the most recent block.
    pub last_version: u64,
}

/// Counters updated by a wave reader after every block.
#[derive(Debug, Default)]
pub struct RenderStats {
    blocks: AtomicU64,
    frames: AtomicU64,
    missed_lookups: AtomicU64,
    faults: AtomicU64,
    last_version: AtomicU64,
}

impl RenderStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_block(&self, frames: usize, version: u64, misses: u64) {
        self.blocks.fetch_add(1, Ordering::Relaxed);
        self.frames.fetch_add(frames as u64, Ordering::Relaxed);
        if misses > 0 {
            self.missed_lookups.fetch_add(misses, Ordering::Relaxed);
        }
        self.last_version.store(version, Ordering::Release);
    }

    #[inline]
    pub(crate) fn record_fault(&self, frames: usize) {
        self.blocks.fetch_add(1, Ordering::Relaxed);
        self.frames.fetch_add(frames as u64, Ordering::Relaxed);
        self.faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn blocks(&self) -> u64 {
        self.blocks.load(Ordering::Relaxed)
    }

    pub fn missed_lookups(&self) -> u64 {
        self.missed_lookups.load(Ordering::Relaxed)
    }

    pub fn faults(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }

    pub fn last_version(&self) -> u64 {
        self.last_version.load(Ordering::Acquire)
    }

    pub fn metrics(&self) -> RenderMetrics {
        RenderMetrics {
            blocks: self.blocks(),
            frames: self.frames.load(Ordering::Relaxed),
            missed_lookups: self.missed_lookups(),
            faults: self.faults(),
            last_version: self.last_version(),
        }
    }

    pub fn reset(&self) {
        self.blocks.store(0, Ordering::Relaxed);
        self.frames.store(0, Ordering::Relaxed);
        self.missed_lookups.store(0, Ordering::Relaxed);
        self.faults.store(0, Ordering::Relaxed);
    }
}
