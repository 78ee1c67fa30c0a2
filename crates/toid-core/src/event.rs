//! Note events on the absolute sample-position axis.

use serde::{Deserialize, Serialize};

/// Frames since playback start. The only time unit in the core.
pub type SamplePosition = u64;

/// Pitch in semitone units (60.0 = middle C).
pub type Pitch = f32;

/// What happens at a [`NoteEvent`]'s position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NoteEventKind {
    /// Start sounding `pitch`, replacing whatever the track was playing.
    On { pitch: Pitch },
    /// Silence the track. `pitch` is only present when the event came from
    /// an explicit note duration (e.g. a melody string).
    Off { pitch: Option<Pitch> },
}

/// A single timestamped note event.
///
/// Created by the reducer and never mutated after it lands in a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub at: SamplePosition,
    pub kind: NoteEventKind,
}

impl NoteEvent {
    pub fn note_on(pitch: Pitch, at: SamplePosition) -> Self {
        Self {
            at,
            kind: NoteEventKind::On { pitch },
        }
    }

    pub fn note_off(at: SamplePosition) -> Self {
        Self {
            at,
            kind: NoteEventKind::Off { pitch: None },
        }
    }

    /// Note-off that remembers which pitch it ends.
    pub fn note_off_pitch(pitch: Pitch, at: SamplePosition) -> Self {
        Self {
            at,
            kind: NoteEventKind::Off { pitch: Some(pitch) },
        }
    }

    /// Sounding pitch, `None` for note-offs.
    #[inline]
    pub fn pitch(&self) -> Option<Pitch> {
        match self.kind {
            NoteEventKind::On { pitch } => Some(pitch),
            NoteEventKind::Off { .. } => None,
        }
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        matches!(self.kind, NoteEventKind::On { .. })
    }
}
