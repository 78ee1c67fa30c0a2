//! Remote control over any text transport.
//!
//! ```text
//! RemotePlayer ──encode──▶ MessageSink ═══ transport ═══▶ RemoteServer ──▶ LocalPlayer
//!                          (String frames)                 decode + apply
//! ```
//!
//! Messages are JSON. The transport only moves strings, so a WebSocket, a
//! pipe or an in-process channel all work the same way; [`channel`] builds
//! the in-process one.

use crate::player::{LocalPlayer, Player};
use crate::{Error, Result};
use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use toid_core::{Action, Snapshot};
use toid_notation::NotationParser;
use tracing::{debug, warn};

/// One control message on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RemoteMessage {
    Action(Action),
    /// Parsed on the receiving side with its own tick.
    Notation {
        track: String,
        notation: String,
        octave: f32,
        #[serde(default)]
        key: f32,
        #[serde(default)]
        looped: bool,
    },
    RegisterResource {
        path: PathBuf,
    },
    LoadInstrument {
        name: String,
    },
    Sync(Snapshot),
}

impl RemoteMessage {
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::Encode)
    }

    pub fn decode(frame: &str) -> Result<Self> {
        serde_json::from_str(frame).map_err(Error::Decode)
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Action(action) => action.name(),
            Self::Notation { .. } => "notation",
            Self::RegisterResource { .. } => "register_resource",
            Self::LoadInstrument { .. } => "load_instrument",
            Self::Sync(_) => "sync",
        }
    }
}

/// Outbound half of a transport.
pub trait MessageSink: Send + Sync {
    fn send(&self, frame: String) -> Result<()>;
}

impl MessageSink for Sender<String> {
    fn send(&self, frame: String) -> Result<()> {
        Sender::send(self, frame).map_err(|_| Error::Disconnected)
    }
}

/// Player that encodes every call and hands it to a [`MessageSink`].
///
/// Notation is checked locally before sending, so syntax errors surface to
/// the caller instead of on the server.
pub struct RemotePlayer<S: MessageSink> {
    sink: S,
    parser: NotationParser,
}

impl<S: MessageSink> RemotePlayer<S> {
    pub fn new(sink: S) -> Self {
        Self::with_parser(sink, NotationParser::default())
    }

    pub fn with_parser(sink: S, parser: NotationParser) -> Self {
        Self { sink, parser }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn send(&self, message: &RemoteMessage) -> Result<()> {
        let frame = message.encode()?;
        self.sink.send(frame)?;
        debug!(message = message.name(), "sent remote message");
        Ok(())
    }

    fn send_notation_message(
        &self,
        notation: &str,
        octave: f32,
        key: f32,
        track: &str,
        looped: bool,
    ) -> Result<()> {
        self.parser.parse_notes_in_key(notation, octave, key)?;
        self.send(&RemoteMessage::Notation {
            track: track.to_string(),
            notation: notation.to_string(),
            octave,
            key,
            looped,
        })
    }
}

impl<S: MessageSink> Player for RemotePlayer<S> {
    fn apply(&self, action: Action) -> Result<()> {
        self.send(&RemoteMessage::Action(action))
    }

    fn register_resource(&self, path: &Path) -> Result<()> {
        self.send(&RemoteMessage::RegisterResource {
            path: path.to_path_buf(),
        })
    }

    fn load_instrument(&self, name: &str) -> Result<()> {
        self.send(&RemoteMessage::LoadInstrument {
            name: name.to_string(),
        })
    }

    fn send_notation_in_key(
        &self,
        notation: &str,
        octave: f32,
        key: f32,
        track: &str,
    ) -> Result<()> {
        self.send_notation_message(notation, octave, key, track, false)
    }

    fn loop_notation_in_key(
        &self,
        notation: &str,
        octave: f32,
        key: f32,
        track: &str,
    ) -> Result<()> {
        self.send_notation_message(notation, octave, key, track, true)
    }

    fn sync(&self, snapshot: Snapshot) -> Result<()> {
        self.send(&RemoteMessage::Sync(snapshot))
    }
}

/// Frame counts from [`RemoteServer::serve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    pub applied: u64,
    pub rejected: u64,
}

/// Receiving end: decodes frames and replays them on a [`LocalPlayer`].
pub struct RemoteServer {
    player: LocalPlayer,
}

impl RemoteServer {
    pub fn new(player: LocalPlayer) -> Self {
        Self { player }
    }

    pub fn player(&self) -> &LocalPlayer {
        &self.player
    }

    pub fn handle(&self, message: RemoteMessage) -> Result<()> {
        match message {
            RemoteMessage::Action(action) => self.player.apply(action),
            RemoteMessage::Notation {
                track,
                notation,
                octave,
                key,
                looped: false,
            } => self.player.send_notation_in_key(&notation, octave, key, &track),
            RemoteMessage::Notation {
                track,
                notation,
                octave,
                key,
                looped: true,
            } => self.player.loop_notation_in_key(&notation, octave, key, &track),
            RemoteMessage::RegisterResource { path } => self.player.register_resource(&path),
            RemoteMessage::LoadInstrument { name } => self.player.load_instrument(&name),
            RemoteMessage::Sync(snapshot) => self.player.sync(snapshot),
        }
    }

    pub fn handle_frame(&self, frame: &str) -> Result<()> {
        self.handle(RemoteMessage::decode(frame)?)
    }

    /// Apply frames until every sender is gone. Bad frames are logged and
    /// skipped.
    pub fn serve(&self, frames: &Receiver<String>) -> ServeSummary {
        let mut summary = ServeSummary::default();
        for frame in frames.iter() {
            match self.handle_frame(&frame) {
                Ok(()) => summary.applied += 1,
                Err(e) => {
                    warn!(error = %e, "rejected remote message");
                    summary.rejected += 1;
                }
            }
        }
        summary
    }
}

/// In-process transport: a player plus the receiver to hand to
/// [`RemoteServer::serve`].
pub fn channel() -> (RemotePlayer<Sender<String>>, Receiver<String>) {
    let (sender, receiver) = crossbeam_channel::unbounded();
    (RemotePlayer::new(sender), receiver)
}
