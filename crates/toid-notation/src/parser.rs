//! Numeric melody notation.
//!
//! One character per tick:
//!
//! | Char | Meaning |
//! |---|---|
//! | `1`-`7` | C-major scale degree starting at C3 (48) |
//! | `8`, `9` | C4 (60) and D4 (62) |
//! | `0`, space | rest |
//! | `-` | hold the previous note (or rest) one more tick |
//!
//! Every pitch is shifted by `octave * 12 + key` semitones.
//!
//! ```ignore
//! let notes = parse_notes("1-3 5", 0.0)?;
//! // C3 for two ticks, E3, a rest, G3
//! let notes = parse_notes_in_key("1-3 5", 0.0, 2.0)?;
//! // the same in D
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use toid_core::{Action, NoteEvent, Pitch, SamplePosition, DEFAULT_TICK};

/// Pitch of each degree `1..=9` with no offset.
const DEGREE_PITCHES: [Pitch; 9] = [48.0, 50.0, 52.0, 53.0, 55.0, 57.0, 59.0, 60.0, 62.0];

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    /// Scale degree, 1-based.
    Degree(u8),
    Rest,
    Tie,
}

fn tokenize(notation: &str) -> Result<Vec<Token>> {
    notation
        .chars()
        .enumerate()
        .map(|(index, character)| match character {
            '1'..='9' => Ok(Token::Degree(character as u8 - b'0')),
            '0' | ' ' => Ok(Token::Rest),
            '-' => Ok(Token::Tie),
            _ => Err(Error::InvalidNotation { character, index }),
        })
        .collect()
}

/// A note with an explicit duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteSpec {
    pub pitch: Pitch,
    pub start: SamplePosition,
    pub duration: SamplePosition,
}

impl NoteSpec {
    #[inline]
    pub fn end(&self) -> SamplePosition {
        self.start + self.duration
    }
}

/// Events parsed from one notation string, bound for one track.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteBatch {
    pub track: String,
    /// Sorted by position; at a shared position the note-off comes first.
    pub events: Vec<NoteEvent>,
    length: SamplePosition,
}

impl NoteBatch {
    /// Frames covered by the notation: token count times tick.
    pub fn length(&self) -> SamplePosition {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Action installing this batch as the whole content of its track.
    /// Any loop on the track is cleared.
    pub fn into_replace_action(self) -> Action {
        Action::replace_track(self.track, self.events)
    }

    /// Like [`into_replace_action`](Self::into_replace_action), with the
    /// track looping over the batch's length in the same step. An empty
    /// notation has no length, so the track does not loop.
    pub fn into_loop_action(self) -> Action {
        Action::ReplaceTrack {
            track: self.track,
            events: self.events,
            loop_length: Some(self.length).filter(|&length| length > 0),
        }
    }

    /// Action inserting this batch next to what the track already holds.
    pub fn into_add_action(self) -> Action {
        Action::AddBatch {
            track: self.track,
            events: self.events,
        }
    }
}

/// Parser with a fixed tick length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotationParser {
    tick: SamplePosition,
}

impl Default for NotationParser {
    fn default() -> Self {
        Self { tick: DEFAULT_TICK }
    }
}

impl NotationParser {
    pub fn new(tick: SamplePosition) -> Result<Self> {
        if tick == 0 {
            return Err(Error::InvalidTick);
        }
        Ok(Self { tick })
    }

    pub fn tick(&self) -> SamplePosition {
        self.tick
    }

    /// Frames covered by `token_count` tokens.
    pub fn length_of(&self, token_count: usize) -> SamplePosition {
        token_count as SamplePosition * self.tick
    }

    /// Notes with explicit start and duration, in start order.
    ///
    /// `octave` is multiplied by 12 and added to every pitch; a fractional
    /// offset is a constant bias.
    pub fn parse_notes(&self, notation: &str, octave: f32) -> Result<Vec<NoteSpec>> {
        self.parse_notes_in_key(notation, octave, 0.0)
    }

    /// [`parse_notes`](Self::parse_notes) transposed by `key` semitones.
    pub fn parse_notes_in_key(
        &self,
        notation: &str,
        octave: f32,
        key: f32,
    ) -> Result<Vec<NoteSpec>> {
        if !octave.is_finite() {
            return Err(Error::InvalidOctave(octave));
        }
        if !key.is_finite() {
            return Err(Error::InvalidKey(key));
        }
        let offset = octave * 12.0 + key;

        let mut notes: Vec<NoteSpec> = Vec::new();
        // Whether the last non-tie token was a note, i.e. whether `-`
        // extends `notes.last()` or a rest.
        let mut sounding = false;

        for (slot, token) in tokenize(notation)?.into_iter().enumerate() {
            let at = slot as SamplePosition * self.tick;
            match token {
                Token::Degree(degree) => {
                    notes.push(NoteSpec {
                        pitch: DEGREE_PITCHES[usize::from(degree - 1)] + offset,
                        start: at,
                        duration: self.tick,
                    });
                    sounding = true;
                }
                Token::Rest => sounding = false,
                Token::Tie => {
                    if let (true, Some(note)) = (sounding, notes.last_mut()) {
                        note.duration += self.tick;
                    }
                }
            }
        }

        Ok(notes)
    }

    /// Note-on/note-off events for `track`: each note yields an `On` at its
    /// start and an `Off` carrying its pitch at its end.
    pub fn parse(&self, notation: &str, octave: f32, track: &str) -> Result<NoteBatch> {
        self.parse_in_key(notation, octave, 0.0, track)
    }

    /// [`parse`](Self::parse) transposed by `key` semitones.
    pub fn parse_in_key(
        &self,
        notation: &str,
        octave: f32,
        key: f32,
        track: &str,
    ) -> Result<NoteBatch> {
        let notes = self.parse_notes_in_key(notation, octave, key)?;

        let mut events = Vec::with_capacity(notes.len() * 2);
        for note in &notes {
            events.push(NoteEvent::note_on(note.pitch, note.start));
            events.push(NoteEvent::note_off_pitch(note.pitch, note.end()));
        }
        // Stable: an Off pushed before an On at the same position stays first.
        events.sort_by_key(|e| e.at);

        Ok(NoteBatch {
            track: track.to_string(),
            events,
            length: self.length_of(notation.chars().count()),
        })
    }
}

/// [`NotationParser::parse`] with the default tick.
pub fn parse(notation: &str, octave: f32, track: &str) -> Result<NoteBatch> {
    NotationParser::default().parse(notation, octave, track)
}

/// [`NotationParser::parse_notes`] with the default tick.
pub fn parse_notes(notation: &str, octave: f32) -> Result<Vec<NoteSpec>> {
    NotationParser::default().parse_notes(notation, octave)
}

/// [`NotationParser::parse_notes_in_key`] with the default tick.
pub fn parse_notes_in_key(notation: &str, octave: f32, key: f32) -> Result<Vec<NoteSpec>> {
    NotationParser::default().parse_notes_in_key(notation, octave, key)
}
