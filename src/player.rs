//! Control-side front-ends.
//!
//! A [`Player`] is what live-coding code talks to. Every call ends up as one
//! or more [`Action`]s on a reducer: directly for [`LocalPlayer`], or after a
//! trip over the wire for [`RemotePlayer`](crate::remote::RemotePlayer).

use crate::Result;
use std::path::Path;
use std::sync::Arc;
use toid_core::{
    Action, MusicStore, NoteEvent, Pitch, Reducer, SamplePosition, Snapshot, StoreVersion,
};
use toid_notation::NotationParser;
use toid_sampler::ResourceManager;

/// Control surface shared by local and remote players.
///
/// Only the handful of required methods differ between implementations; the
/// note helpers are all expressed as [`apply`](Self::apply).
pub trait Player: Send + Sync {
    /// Submit one reducer action.
    fn apply(&self, action: Action) -> Result<()>;

    /// Register an instrument catalog file.
    fn register_resource(&self, path: &Path) -> Result<()>;

    /// Decode and activate `"<catalog>.<instrument>"`.
    fn load_instrument(&self, name: &str) -> Result<()>;

    /// Parse `notation`, shifted by `octave * 12 + key` semitones, and
    /// replace `track` with the result. Any loop on `track` is cleared.
    fn send_notation_in_key(
        &self,
        notation: &str,
        octave: f32,
        key: f32,
        track: &str,
    ) -> Result<()>;

    /// Like [`send_notation_in_key`](Self::send_notation_in_key), and loop
    /// `track` over the melody's length. Both land in one store version.
    fn loop_notation_in_key(
        &self,
        notation: &str,
        octave: f32,
        key: f32,
        track: &str,
    ) -> Result<()>;

    fn send_notation(&self, notation: &str, octave: f32, track: &str) -> Result<()> {
        self.send_notation_in_key(notation, octave, 0.0, track)
    }

    fn loop_notation(&self, notation: &str, octave: f32, track: &str) -> Result<()> {
        self.loop_notation_in_key(notation, octave, 0.0, track)
    }

    /// `None` selects the built-in sine.
    fn set_instrument(&self, name: Option<&str>) -> Result<()> {
        self.apply(Action::SetInstrument {
            name: name.map(str::to_string),
        })
    }

    /// Play `track` through `name` instead of the store-wide selection.
    /// `None` goes back to the store-wide selection.
    fn set_track_instrument(&self, track: &str, name: Option<&str>) -> Result<()> {
        self.apply(Action::SetTrackInstrument {
            track: track.to_string(),
            name: name.map(str::to_string),
        })
    }

    /// `-1.0` is hard left, `1.0` hard right.
    fn set_track_pan(&self, track: &str, pan: f32) -> Result<()> {
        self.apply(Action::SetTrackPan {
            track: track.to_string(),
            pan,
        })
    }

    fn set_track_gain(&self, track: &str, gain: f32) -> Result<()> {
        self.apply(Action::SetTrackGain {
            track: track.to_string(),
            gain,
        })
    }

    fn set_track_from_notation(&self, track: &str, notation: &str) -> Result<()> {
        self.send_notation(notation, 0.0, track)
    }

    fn set_track_from_notation_with_octave(
        &self,
        track: &str,
        notation: &str,
        octave: f32,
    ) -> Result<()> {
        self.send_notation(notation, octave, track)
    }

    fn add_note_on(&self, track: &str, pitch: Pitch, at: SamplePosition) -> Result<()> {
        self.apply(Action::note_on(track, pitch, at))
    }

    fn add_note_off(&self, track: &str, at: SamplePosition) -> Result<()> {
        self.apply(Action::note_off(track, at))
    }

    /// A note with an explicit length: `On` at `at` and a pitched `Off` at
    /// `at + duration`, inserted together.
    fn add_note(
        &self,
        track: &str,
        pitch: Pitch,
        duration: SamplePosition,
        at: SamplePosition,
    ) -> Result<()> {
        self.apply(Action::AddBatch {
            track: track.to_string(),
            events: vec![
                NoteEvent::note_on(pitch, at),
                NoteEvent::note_off_pitch(pitch, at.saturating_add(duration)),
            ],
        })
    }

    fn remove_track(&self, track: &str) -> Result<()> {
        self.apply(Action::RemoveTrack {
            track: track.to_string(),
        })
    }

    fn clear(&self) -> Result<()> {
        self.apply(Action::Clear)
    }

    /// Replace all tracks and the instrument selection in one step.
    fn sync(&self, snapshot: Snapshot) -> Result<()> {
        self.apply(Action::Restore(snapshot))
    }
}

/// In-process player writing straight into a reducer.
///
/// Cheap to clone; clones share the store and the resource manager.
#[derive(Clone)]
pub struct LocalPlayer {
    reducer: Arc<Reducer>,
    resources: Arc<ResourceManager>,
    parser: NotationParser,
}

impl LocalPlayer {
    pub fn new(
        reducer: Arc<Reducer>,
        resources: Arc<ResourceManager>,
        parser: NotationParser,
    ) -> Self {
        Self {
            reducer,
            resources,
            parser,
        }
    }

    pub fn store(&self) -> &Arc<MusicStore> {
        self.reducer.store()
    }

    pub fn resources(&self) -> &Arc<ResourceManager> {
        &self.resources
    }

    pub fn parser(&self) -> &NotationParser {
        &self.parser
    }

    pub fn latest(&self) -> Arc<StoreVersion> {
        self.store().latest()
    }

    /// Owned copy of the current state, suitable for [`Player::sync`].
    pub fn snapshot(&self) -> Snapshot {
        self.latest().snapshot()
    }
}

impl Player for LocalPlayer {
    fn apply(&self, action: Action) -> Result<()> {
        self.reducer.apply(action)?;
        Ok(())
    }

    fn register_resource(&self, path: &Path) -> Result<()> {
        self.resources.register(path)?;
        Ok(())
    }

    fn load_instrument(&self, name: &str) -> Result<()> {
        self.resources.load(name)?;
        Ok(())
    }

    fn send_notation_in_key(
        &self,
        notation: &str,
        octave: f32,
        key: f32,
        track: &str,
    ) -> Result<()> {
        let batch = self.parser.parse_in_key(notation, octave, key, track)?;
        self.apply(batch.into_replace_action())
    }

    fn loop_notation_in_key(
        &self,
        notation: &str,
        octave: f32,
        key: f32,
        track: &str,
    ) -> Result<()> {
        let batch = self.parser.parse_in_key(notation, octave, key, track)?;
        self.apply(batch.into_loop_action())
    }
}
