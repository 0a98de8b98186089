//! Defines the musical intervals used to build chords.

use std::fmt::{Display, Formatter, Result};

/// Defines the different musical intervals measured from the root of a chord.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Interval {
    Unison,
    MinorSecond,
    MajorSecond,
    MinorThird,
    MajorThird,
    PerfectFourth,
    DiminishedFifth,
    PerfectFifth,
    AugmentedFifth,
    MajorSixth,
    MinorSeventh,
    MajorSeventh,
    Octave,
}

impl Interval {
    /// Returns the size of the interval in semitones.
    #[must_use]
    pub fn semitones(&self) -> i32 {
        match self {
            Interval::Unison => 0,
            Interval::MinorSecond => 1,
            Interval::MajorSecond => 2,
            Interval::MinorThird => 3,
            Interval::MajorThird => 4,
            Interval::PerfectFourth => 5,
            Interval::DiminishedFifth => 6,
            Interval::PerfectFifth => 7,
            Interval::AugmentedFifth => 8,
            Interval::MajorSixth => 9,
            Interval::MinorSeventh => 10,
            Interval::MajorSeventh => 11,
            Interval::Octave => 12,
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Interval::Unison => write!(f, "Unison"),
            Interval::MinorSecond => write!(f, "Minor Second"),
            Interval::MajorSecond => write!(f, "Major Second"),
            Interval::MinorThird => write!(f, "Minor Third"),
            Interval::MajorThird => write!(f, "Major Third"),
            Interval::PerfectFourth => write!(f, "Perfect Fourth"),
            Interval::DiminishedFifth => write!(f, "Diminished Fifth"),
            Interval::PerfectFifth => write!(f, "Perfect Fifth"),
            Interval::AugmentedFifth => write!(f, "Augmented Fifth"),
            Interval::MajorSixth => write!(f, "Major Sixth"),
            Interval::MinorSeventh => write!(f, "Minor Seventh"),
            Interval::MajorSeventh => write!(f, "Major Seventh"),
            Interval::Octave => write!(f, "Octave"),
        }
    }
}
