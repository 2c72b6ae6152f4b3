//! Error types for the tabletop engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MtgError {
    /// A game, player, card or zone entry is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// A required field is missing or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The action has no defined effect in the current phase/step
    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Unknown action type: {0}")]
    UnknownAction(String),

    #[error("Match {0} is closed")]
    MatchClosed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for MtgError {
    fn from(err: serde_json::Error) -> Self {
        MtgError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MtgError>;
