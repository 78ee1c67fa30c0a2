//! Immutable store snapshots.

use super::track::Track;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Immutable snapshot of every track plus the active instrument.
///
/// Tracks are held behind `Arc` so a new version only copies the tracks an
/// action touched; everything else is shared with the previous version.
#[derive(Debug, Clone, Default)]
pub struct StoreVersion {
    version: u64,
    tracks: BTreeMap<String, Arc<Track>>,
    instrument: Option<String>,
}

impl StoreVersion {
    /// The empty version every store starts from.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Monotonic version number, 0 for the empty store.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn track(&self, name: &str) -> Option<&Arc<Track>> {
        self.tracks.get(name)
    }

    /// Tracks in name order.
    #[inline]
    pub fn tracks(&self) -> impl Iterator<Item = (&str, &Arc<Track>)> {
        self.tracks.iter().map(|(name, track)| (name.as_str(), track))
    }

    pub fn track_names(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Name of the selected instrument; `None` means the built-in oscillator.
    #[inline]
    pub fn instrument(&self) -> Option<&str> {
        self.instrument.as_deref()
    }

    pub fn total_events(&self) -> usize {
        self.tracks.values().map(|t| t.len()).sum()
    }

    /// Owned, serializable copy of this version.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tracks: self
                .tracks
                .iter()
                .map(|(name, track)| (name.clone(), Track::clone(track)))
                .collect(),
            instrument: self.instrument.clone(),
        }
    }

    /// Copy of this version numbered as its successor.
    pub(crate) fn successor(&self) -> Self {
        Self {
            version: self.version + 1,
            tracks: self.tracks.clone(),
            instrument: self.instrument.clone(),
        }
    }

    /// Mutable access to a track, creating it on first use. Copies the track
    /// only if an older version still shares it.
    pub(crate) fn track_mut(&mut self, name: &str) -> &mut Track {
        let track = self.tracks.entry(name.to_string()).or_default();
        Arc::make_mut(track)
    }

    pub(crate) fn remove_track(&mut self, name: &str) -> bool {
        self.tracks.remove(name).is_some()
    }

    pub(crate) fn clear_tracks(&mut self) {
        self.tracks.clear();
    }

    pub(crate) fn set_instrument(&mut self, name: Option<String>) {
        self.instrument = name;
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.tracks = snapshot
            .tracks
            .into_iter()
            .map(|(name, track)| (name, Arc::new(track)))
            .collect();
        self.instrument = snapshot.instrument;
    }
}

/// Serializable contents of a [`StoreVersion`], without the version number.
///
/// Used to bring a remote peer up to date in one step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tracks: BTreeMap<String, Track>,
    pub instrument: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NoteEvent;

    #[test]
    fn test_successor_shares_untouched_tracks() {
        let mut first = StoreVersion::empty().successor();
        first.track_mut("main").replace(vec![NoteEvent::note_on(60.0, 0)], None);
        first.track_mut("sub").replace(vec![NoteEvent::note_on(48.0, 0)], None);

        let mut second = first.successor();
        second.track_mut("main").replace(vec![NoteEvent::note_on(62.0, 0)], None);

        assert_eq!(second.version(), first.version() + 1);
        assert!(Arc::ptr_eq(
            first.track("sub").unwrap(),
            second.track("sub").unwrap()
        ));
        assert!(!Arc::ptr_eq(
            first.track("main").unwrap(),
            second.track("main").unwrap()
        ));
        assert_eq!(first.track("main").unwrap().events()[0].pitch(), Some(60.0));
    }

    #[test]
    fn test_snapshot_restore() {
        let mut version = StoreVersion::empty().successor();
        version.track_mut("main").replace(vec![NoteEvent::note_on(60.0, 0)], None);
        version.set_instrument(Some("sf2.test".into()));

        let snapshot = version.snapshot();
        let mut restored = StoreVersion::empty().successor();
        restored.restore(snapshot.clone());

        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.instrument(), Some("sf2.test"));
        assert_eq!(restored.track_names().collect::<Vec<_>>(), vec!["main"]);
    }
}
