//! Error types for toid-notation.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid notation character '{character}' at index {index}")]
    InvalidNotation { character: char, index: usize },

    #[error("Invalid octave offset: {0}. Must be finite")]
    InvalidOctave(f32),

    #[error("Invalid key offset: {0}. Must be finite")]
    InvalidKey(f32),

    #[error("Tick must be at least one frame")]
    InvalidTick,
}

pub type Result<T> = core::result::Result<T, Error>;
