//! Contains types and functions for working with notes, pitches, and chords.

pub mod chords;
pub mod intervals;
pub mod notes;
