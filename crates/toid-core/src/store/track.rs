//! A single melody track: an ordered event log plus playback properties.

use crate::event::{NoteEvent, NoteEventKind, SamplePosition};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// How a track accepts events that arrive out of position order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackPolicy {
    /// Insert each event at its position. Events sharing a position keep
    /// their arrival order.
    #[default]
    Sorted,
    /// Reject any event earlier than the last recorded one.
    StrictAppend,
}

/// Event log for one track, kept sorted by `at`.
///
/// A deserialized track is unchecked until it has been through
/// [`normalize`](Self::normalize); the reducer does that on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    events: Vec<NoteEvent>,
    policy: TrackPolicy,
    gain: f32,
    loop_length: Option<SamplePosition>,
    /// -1.0 is hard left, 1.0 hard right.
    #[serde(default)]
    pan: f32,
    /// Overrides the store-wide instrument selection.
    #[serde(default)]
    instrument: Option<String>,
}

impl Default for Track {
    fn default() -> Self {
        Self::new()
    }
}

impl Track {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            policy: TrackPolicy::default(),
            gain: 1.0,
            loop_length: None,
            pan: 0.0,
            instrument: None,
        }
    }

    pub fn with_policy(policy: TrackPolicy) -> Self {
        Self {
            policy,
            ..Self::new()
        }
    }

    #[inline]
    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn policy(&self) -> TrackPolicy {
        self.policy
    }

    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain
    }

    #[inline]
    pub fn loop_length(&self) -> Option<SamplePosition> {
        self.loop_length
    }

    #[inline]
    pub fn pan(&self) -> f32 {
        self.pan
    }

    /// Instrument chosen for this track alone, if any.
    #[inline]
    pub fn instrument(&self) -> Option<&str> {
        self.instrument.as_deref()
    }

    /// Position of the latest event in the log.
    pub fn last_position(&self) -> Option<SamplePosition> {
        self.events.last().map(|e| e.at)
    }

    /// Most recent event with `at <= position`, ignoring any loop.
    ///
    /// Ties resolve to the event that arrived last.
    pub fn event_at(&self, position: SamplePosition) -> Option<&NoteEvent> {
        let idx = self.events.partition_point(|e| e.at <= position);
        idx.checked_sub(1).map(|i| &self.events[i])
    }

    /// Events visible to playback: everything, or only the events inside
    /// the loop window when the track loops.
    #[inline]
    pub(crate) fn reachable_events(&self) -> &[NoteEvent] {
        match self.loop_length {
            Some(length) => {
                let end = self.events.partition_point(|e| e.at < length);
                &self.events[..end]
            }
            None => &self.events,
        }
    }

    pub(crate) fn insert(&mut self, name: &str, event: NoteEvent) -> Result<()> {
        match self.policy {
            TrackPolicy::StrictAppend => {
                if let Some(last) = self.last_position() {
                    if event.at < last {
                        return Err(Error::NonMonotonicEvent {
                            track: name.to_string(),
                            at: event.at,
                            last,
                        });
                    }
                }
                self.events.push(event);
            }
            TrackPolicy::Sorted => {
                let idx = self.events.partition_point(|e| e.at <= event.at);
                self.events.insert(idx, event);
            }
        }
        Ok(())
    }

    /// Replace the whole log and the loop length. The sort is stable so
    /// same-position events keep the order they were given in.
    pub(crate) fn replace(
        &mut self,
        mut events: Vec<NoteEvent>,
        loop_length: Option<SamplePosition>,
    ) {
        events.sort_by_key(|e| e.at);
        self.events = events;
        self.loop_length = loop_length;
    }

    /// Check every field and restore log order.
    ///
    /// A `Sorted` log is stably re-sorted. A `StrictAppend` log must
    /// already be in order.
    pub(crate) fn normalize(&mut self, name: &str) -> Result<()> {
        for event in &self.events {
            validate_event(event)?;
        }
        check_gain(name, self.gain)?;
        check_pan(name, self.pan)?;
        check_loop_length(name, self.loop_length)?;

        match self.policy {
            TrackPolicy::Sorted => self.events.sort_by_key(|e| e.at),
            TrackPolicy::StrictAppend => {
                if let Some(pair) = self.events.windows(2).find(|w| w[1].at < w[0].at) {
                    return Err(Error::NonMonotonicEvent {
                        track: name.to_string(),
                        at: pair[1].at,
                        last: pair[0].at,
                    });
                }
            }
        }
        Ok(())
    }

    pub(crate) fn set_policy(&mut self, policy: TrackPolicy) {
        self.policy = policy;
    }

    pub(crate) fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    pub(crate) fn set_loop_length(&mut self, length: Option<SamplePosition>) {
        self.loop_length = length;
    }

    pub(crate) fn set_pan(&mut self, pan: f32) {
        self.pan = pan;
    }

    pub(crate) fn set_instrument(&mut self, name: Option<String>) {
        self.instrument = name;
    }
}

pub(crate) fn validate_event(event: &NoteEvent) -> Result<()> {
    match event.kind {
        NoteEventKind::On { pitch } | NoteEventKind::Off { pitch: Some(pitch) } => {
            if !pitch.is_finite() {
                return Err(Error::InvalidPitch(pitch));
            }
        }
        NoteEventKind::Off { pitch: None } => {}
    }
    Ok(())
}

pub(crate) fn check_gain(track: &str, gain: f32) -> Result<()> {
    if !gain.is_finite() || gain < 0.0 {
        return Err(Error::InvalidAction(format!(
            "gain for track '{track}' must be finite and non-negative, got {gain}"
        )));
    }
    Ok(())
}

pub(crate) fn check_pan(track: &str, pan: f32) -> Result<()> {
    if !(-1.0..=1.0).contains(&pan) {
        return Err(Error::InvalidAction(format!(
            "pan for track '{track}' must be within -1.0..=1.0, got {pan}"
        )));
    }
    Ok(())
}

pub(crate) fn check_loop_length(track: &str, length: Option<SamplePosition>) -> Result<()> {
    if length == Some(0) {
        return Err(Error::InvalidAction(format!(
            "loop length for track '{track}' must be at least one frame"
        )));
    }
    Ok(())
}
