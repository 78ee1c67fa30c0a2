//! Event-sourced note store.
//!
//! - [`Action`] - every mutation the store accepts
//! - [`Reducer`] - the single writer; validates, reduces, publishes
//! - [`MusicStore`] - holder of the latest published [`StoreVersion`]
//! - [`Track`] - one melody line's ordered event log

mod action;
mod reducer;
mod track;
mod version;

pub use action::Action;
pub use reducer::{reduce, MusicStore, Reducer};
pub use track::{Track, TrackPolicy};
pub use version::{Snapshot, StoreVersion};
