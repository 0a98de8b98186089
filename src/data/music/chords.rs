//! Defines the chord qualities used by the drills and the logic to identify a chord from its notes.
//!
//! Identification is purely based on interval patterns: the lowest sounding note is always taken as
//! the root and the offsets of the other notes are matched against the templates of each quality.
//! Inversions are not normalized, so an inverted triad is reported as a generic chord.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use strum::{Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator};

use crate::data::music::{intervals::Interval, notes::Pitch};

/// The qualities of the triads that can be drilled.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    StrumDisplay,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[allow(missing_docs)]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
}

impl ChordQuality {
    /// Returns the intervals above the root that make up a chord of this quality.
    #[must_use]
    pub fn intervals(&self) -> [Interval; 3] {
        match self {
            ChordQuality::Major => [
                Interval::Unison,
                Interval::MajorThird,
                Interval::PerfectFifth,
            ],
            ChordQuality::Minor => [
                Interval::Unison,
                Interval::MinorThird,
                Interval::PerfectFifth,
            ],
            ChordQuality::Diminished => [
                Interval::Unison,
                Interval::MinorThird,
                Interval::DiminishedFifth,
            ],
            ChordQuality::Augmented => [
                Interval::Unison,
                Interval::MajorThird,
                Interval::AugmentedFifth,
            ],
        }
    }

    /// Returns the semitone offsets from the root of a chord of this quality.
    #[must_use]
    pub fn offsets(&self) -> [i32; 3] {
        self.intervals().map(|interval| interval.semitones())
    }

    /// Returns the quality whose offsets match the given ones exactly, if any.
    #[must_use]
    pub fn from_offsets(offsets: &[i32]) -> Option<ChordQuality> {
        ChordQuality::iter().find(|quality| quality.offsets()[..] == *offsets)
    }

    /// Returns the short label used when naming a chord of this quality.
    #[must_use]
    pub fn abbreviation(&self) -> &'static str {
        match self {
            ChordQuality::Major => "maj",
            ChordQuality::Minor => "min",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
        }
    }
}

/// The name given to a group of notes by [identify_chord].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChordName {
    /// A single note, named after itself.
    Note(Pitch),

    /// Two or more notes named after their lowest note. The quality is missing if the intervals
    /// above the root do not match any of the known templates.
    Chord {
        /// The lowest sounding note.
        root: Pitch,

        /// The matching quality, if any.
        quality: Option<ChordQuality>,
    },
}

impl Display for ChordName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ChordName::Note(pitch) => write!(f, "{pitch}"),
            ChordName::Chord { root, quality } => write!(
                f,
                "{}{}{}",
                root.note.to_ascii_string(),
                quality.map_or("chord", |q| q.abbreviation()),
                root.octave
            ),
        }
    }
}

/// Identifies the chord formed by the given notes. Returns `None` if there are no notes.
#[must_use]
pub fn identify_chord(notes: &[Pitch]) -> Option<ChordName> {
    match notes {
        [] => None,
        [single] => Some(ChordName::Note(*single)),
        _ => {
            // Sort the notes by pitch so that the lowest sounding one becomes the root.
            let mut sorted = notes.to_vec();
            sorted.sort_by_key(Pitch::absolute_semitone);
            let root = sorted[0];

            // Compare the offsets above the root with the templates of every quality.
            let offsets: Vec<i32> = sorted
                .iter()
                .map(|p| p.absolute_semitone() - root.absolute_semitone())
                .collect();
            Some(ChordName::Chord {
                root,
                quality: ChordQuality::from_offsets(&offsets),
            })
        }
    }
}
