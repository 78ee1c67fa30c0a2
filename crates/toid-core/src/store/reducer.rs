//! The store, its reducer, and lock-free publishing.
//!
//! ```text
//! Control thread(s)                      Audio thread
//!     │                                       │
//!     ▼                                       ▼
//! ┌─────────────────┐                 ┌─────────────────┐
//! │ Reducer         │                 │ WaveReader      │
//! │ - write lock    │──ArcSwap───────▶│ - load()        │
//! │ - reduce()      │                 │ - StoreVersion  │
//! └─────────────────┘                 └─────────────────┘
//! ```
//!
//! Writers serialize on a mutex that the render side never touches. The new
//! version is published with a single atomic pointer swap; a reader that
//! still holds the previous `Arc` keeps seeing it unchanged. Replaced
//! versions are parked in a [`Retired`] list and freed by a later writer.

use super::action::Action;
use super::track::{check_gain, check_loop_length, check_pan, validate_event};
use super::version::StoreVersion;
use crate::event::NoteEvent;
use crate::reclaim::Retired;
use crate::Result;
use arc_swap::{ArcSwap, Guard};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Holder of the latest published [`StoreVersion`].
#[derive(Debug)]
pub struct MusicStore {
    current: ArcSwap<StoreVersion>,
}

impl Default for MusicStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MusicStore {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(StoreVersion::empty()),
        }
    }

    /// RT-safe load of the latest version. Never blocks.
    #[inline]
    pub fn load(&self) -> Guard<Arc<StoreVersion>> {
        self.current.load()
    }

    /// Latest version as an owned `Arc` (control side).
    pub fn latest(&self) -> Arc<StoreVersion> {
        self.current.load_full()
    }

    pub fn version(&self) -> u64 {
        self.current.load().version()
    }

    /// Swap in `version` and hand back the one it replaced.
    fn publish(&self, version: Arc<StoreVersion>) -> Arc<StoreVersion> {
        self.current.swap(version)
    }
}

/// Pure reduce step: the version that results from applying `action` to
/// `state`. `state` is left untouched; on error nothing is produced.
pub fn reduce(state: &StoreVersion, action: Action) -> Result<StoreVersion> {
    let mut next = state.successor();

    match action {
        Action::AddNoteOn { track, pitch, at } => {
            let event = NoteEvent::note_on(pitch, at);
            validate_event(&event)?;
            next.track_mut(&track).insert(&track, event)?;
        }
        Action::AddNoteOff { track, at } => {
            next.track_mut(&track).insert(&track, NoteEvent::note_off(at))?;
        }
        Action::AddBatch { track, events } => {
            events.iter().try_for_each(validate_event)?;
            let target = next.track_mut(&track);
            for event in events {
                target.insert(&track, event)?;
            }
        }
        Action::ReplaceTrack {
            track,
            events,
            loop_length,
        } => {
            events.iter().try_for_each(validate_event)?;
            check_loop_length(&track, loop_length)?;
            next.track_mut(&track).replace(events, loop_length);
        }
        Action::RemoveTrack { track } => {
            if !next.remove_track(&track) {
                debug!(track = %track, "remove of unknown track");
            }
        }
        Action::SetTrackPolicy { track, policy } => {
            next.track_mut(&track).set_policy(policy);
        }
        Action::SetTrackGain { track, gain } => {
            check_gain(&track, gain)?;
            next.track_mut(&track).set_gain(gain);
        }
        Action::SetTrackLoop { track, length } => {
            check_loop_length(&track, length)?;
            next.track_mut(&track).set_loop_length(length);
        }
        Action::SetTrackPan { track, pan } => {
            check_pan(&track, pan)?;
            next.track_mut(&track).set_pan(pan);
        }
        Action::SetTrackInstrument { track, name } => {
            next.track_mut(&track).set_instrument(name);
        }
        Action::SetInstrument { name } => {
            next.set_instrument(name);
        }
        Action::Clear => {
            next.clear_tracks();
        }
        Action::Restore(mut snapshot) => {
            for (name, track) in snapshot.tracks.iter_mut() {
                track.normalize(name)?;
            }
            next.restore(snapshot);
        }
    }

    Ok(next)
}

/// The only writer to a [`MusicStore`].
///
/// Cheap to share behind an `Arc`; concurrent `apply` calls are serialized.
#[derive(Debug)]
pub struct Reducer {
    store: Arc<MusicStore>,
    write: Mutex<()>,
    retired: Retired<StoreVersion>,
}

impl Reducer {
    pub fn new(store: Arc<MusicStore>) -> Self {
        Self {
            store,
            write: Mutex::new(()),
            retired: Retired::new(),
        }
    }

    pub fn store(&self) -> &Arc<MusicStore> {
        &self.store
    }

    /// Apply one action and publish the resulting version.
    ///
    /// On error the store is unchanged and nothing is published.
    pub fn apply(&self, action: Action) -> Result<Arc<StoreVersion>> {
        let _guard = self.write.lock();
        let name = action.name();
        let current = self.store.latest();
        let next = Arc::new(reduce(&current, action)?);
        drop(current);
        self.retired.retire(self.store.publish(Arc::clone(&next)));
        debug!(
            action = name,
            version = next.version(),
            events = next.total_events(),
            "published store version"
        );
        Ok(next)
    }

    /// Replaced versions still held by a reader. They are freed by a later
    /// `apply` (or [`collect_retired`](Self::collect_retired)), never by
    /// the reader.
    pub fn retired_versions(&self) -> usize {
        self.retired.len()
    }

    /// Free replaced versions nobody holds any more. Returns how many are
    /// still held.
    pub fn collect_retired(&self) -> usize {
        self.retired.collect()
    }

    /// Apply actions in order, stopping at the first failure. Actions before
    /// the failing one stay applied.
    pub fn apply_all(&self, actions: impl IntoIterator<Item = Action>) -> Result<u64> {
        let mut version = self.store.version();
        for action in actions {
            version = self.apply(action)?.version();
        }
        Ok(version)
    }
}
