//! Numeric melody notation for the toid sequencer.
//!
//! Turns strings like `"12345 643 2 1"` into note events on the sample axis.
//! Parsing is pure: nothing here touches a store.
//!
//! ```ignore
//! use toid_notation::parse;
//!
//! let batch = parse("1-3 5", 0.0, "main")?;
//! reducer.apply(batch.into_replace_action())?;
//! ```

pub mod error;
pub use error::{Error, Result};

mod parser;
pub use parser::{parse, parse_notes, parse_notes_in_key, NotationParser, NoteBatch, NoteSpec};
