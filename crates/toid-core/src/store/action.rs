//! Reducer actions.

use super::track::TrackPolicy;
use super::version::Snapshot;
use crate::event::{NoteEvent, Pitch, SamplePosition};
use serde::{Deserialize, Serialize};

/// Every mutation the store accepts. The reducer is the only thing that
/// applies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    AddNoteOn {
        track: String,
        pitch: Pitch,
        at: SamplePosition,
    },
    AddNoteOff {
        track: String,
        at: SamplePosition,
    },
    /// Insert several events; all of them land or none do.
    AddBatch {
        track: String,
        events: Vec<NoteEvent>,
    },
    /// Swap the whole log and the loop length of a track in one step.
    /// Gain, pan, policy and instrument are kept.
    ReplaceTrack {
        track: String,
        events: Vec<NoteEvent>,
        #[serde(default)]
        loop_length: Option<SamplePosition>,
    },
    RemoveTrack {
        track: String,
    },
    SetTrackPolicy {
        track: String,
        policy: TrackPolicy,
    },
    SetTrackGain {
        track: String,
        gain: f32,
    },
    /// `None` stops looping.
    SetTrackLoop {
        track: String,
        length: Option<SamplePosition>,
    },
    SetTrackPan {
        track: String,
        pan: f32,
    },
    /// `None` falls back to the store-wide selection.
    SetTrackInstrument {
        track: String,
        name: Option<String>,
    },
    /// `None` selects the built-in oscillator.
    SetInstrument {
        name: Option<String>,
    },
    /// Drop every track.
    Clear,
    /// Replace all tracks and the instrument selection with a snapshot.
    Restore(Snapshot),
}

impl Action {
    pub fn note_on(track: impl Into<String>, pitch: Pitch, at: SamplePosition) -> Self {
        Self::AddNoteOn {
            track: track.into(),
            pitch,
            at,
        }
    }

    pub fn note_off(track: impl Into<String>, at: SamplePosition) -> Self {
        Self::AddNoteOff {
            track: track.into(),
            at,
        }
    }

    pub fn replace_track(track: impl Into<String>, events: Vec<NoteEvent>) -> Self {
        Self::ReplaceTrack {
            track: track.into(),
            events,
            loop_length: None,
        }
    }

    /// Replace a track and loop it every `length` frames.
    pub fn loop_track(
        track: impl Into<String>,
        events: Vec<NoteEvent>,
        length: SamplePosition,
    ) -> Self {
        Self::ReplaceTrack {
            track: track.into(),
            events,
            loop_length: Some(length),
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddNoteOn { .. } => "add_note_on",
            Self::AddNoteOff { .. } => "add_note_off",
            Self::AddBatch { .. } => "add_batch",
            Self::ReplaceTrack { .. } => "replace_track",
            Self::RemoveTrack { .. } => "remove_track",
            Self::SetTrackPolicy { .. } => "set_track_policy",
            Self::SetTrackGain { .. } => "set_track_gain",
            Self::SetTrackLoop { .. } => "set_track_loop",
            Self::SetTrackPan { .. } => "set_track_pan",
            Self::SetTrackInstrument { .. } => "set_track_instrument",
            Self::SetInstrument { .. } => "set_instrument",
            Self::Clear => "clear",
            Self::Restore(_) => "restore",
        }
    }
}
