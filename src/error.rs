//! Contains the errors returned by notedrill.
//!
//! The core scheduling, generation, and grading operations are total and never fail. Errors are
//! only returned at the edges of the library: when parsing textual pitches and when the practice
//! session is driven in an invalid way or handed malformed serialized state.

use thiserror::Error;

/// An error returned when parsing a pitch from its textual representation.
#[derive(Debug, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum PitchError {
    #[error("invalid note letter in pitch {0}")]
    InvalidLetter(String),

    #[error("invalid accidental in pitch {0}")]
    InvalidAccidental(String),

    #[error("invalid octave in pitch {0}")]
    InvalidOctave(String),
}

/// An error returned when driving a practice session.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum SessionError {
    #[error("there is no active challenge to answer")]
    NoActiveChallenge,

    #[error("cannot serialize the item pool: {0}")]
    ExportItems(#[source] serde_json::Error),

    #[error("cannot deserialize the item pool: {0}")]
    ImportItems(#[source] serde_json::Error),
}
