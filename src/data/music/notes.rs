//! Defines the notes, accidentals, and octave-qualified pitches used by the drills.
//!
//! A [Note] is a pitch class spelled with a letter and an accidental (e.g. C♯ or D♭), while a
//! [Pitch] adds the octave and can therefore be compared with other pitches through its absolute
//! semitone value. Two enharmonic spellings share the same semitone value but remain distinct for
//! display purposes.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use crate::error::PitchError;

/// The number of semitones in an octave.
pub const SEMITONES_PER_OCTAVE: i32 = 12;

/// Defines the names of the natural notes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum NaturalNote {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl NaturalNote {
    /// Returns the semitone offset of the natural note relative to C.
    #[must_use]
    pub fn semitone_class(&self) -> i32 {
        match self {
            NaturalNote::C => 0,
            NaturalNote::D => 2,
            NaturalNote::E => 4,
            NaturalNote::F => 5,
            NaturalNote::G => 7,
            NaturalNote::A => 9,
            NaturalNote::B => 11,
        }
    }

    /// Returns the natural note with the given letter, if any.
    #[must_use]
    pub fn from_letter(letter: char) -> Option<NaturalNote> {
        match letter {
            'A' => Some(NaturalNote::A),
            'B' => Some(NaturalNote::B),
            'C' => Some(NaturalNote::C),
            'D' => Some(NaturalNote::D),
            'E' => Some(NaturalNote::E),
            'F' => Some(NaturalNote::F),
            'G' => Some(NaturalNote::G),
            _ => None,
        }
    }
}

impl Display for NaturalNote {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            NaturalNote::A => write!(f, "A"),
            NaturalNote::B => write!(f, "B"),
            NaturalNote::C => write!(f, "C"),
            NaturalNote::D => write!(f, "D"),
            NaturalNote::E => write!(f, "E"),
            NaturalNote::F => write!(f, "F"),
            NaturalNote::G => write!(f, "G"),
        }
    }
}

/// Defines the pitch accidentals that can be applied to a note.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Accidental {
    Natural,
    Flat,
    Sharp,
}

impl Accidental {
    /// Returns the number of semitones by which the accidental alters a natural note.
    #[must_use]
    pub fn alter(&self) -> i32 {
        match self {
            Accidental::Natural => 0,
            Accidental::Flat => -1,
            Accidental::Sharp => 1,
        }
    }

    /// Returns the ASCII symbol of the accidental as used in note names like `C#4` or `Db4`.
    #[must_use]
    pub fn ascii_symbol(&self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Flat => "b",
            Accidental::Sharp => "#",
        }
    }
}

impl Display for Accidental {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Accidental::Natural => Ok(()),
            Accidental::Flat => write!(f, "♭"),
            Accidental::Sharp => write!(f, "♯"),
        }
    }
}

/// The accidental used to spell the black keys when converting a semitone value back to a note.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Spelling {
    /// Spell black keys with sharps (C♯, D♯, F♯, G♯, A♯).
    Sharps,

    /// Spell black keys with flats (D♭, E♭, G♭, A♭, B♭).
    Flats,
}

/// Defines the union of a natural note and an accidental that describes a note.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Note(pub NaturalNote, pub Accidental);

#[allow(missing_docs)]
impl Note {
    pub const A: Note = Note(NaturalNote::A, Accidental::Natural);
    pub const A_FLAT: Note = Note(NaturalNote::A, Accidental::Flat);
    pub const A_SHARP: Note = Note(NaturalNote::A, Accidental::Sharp);
    pub const B: Note = Note(NaturalNote::B, Accidental::Natural);
    pub const B_FLAT: Note = Note(NaturalNote::B, Accidental::Flat);
    pub const C: Note = Note(NaturalNote::C, Accidental::Natural);
    pub const C_SHARP: Note = Note(NaturalNote::C, Accidental::Sharp);
    pub const D: Note = Note(NaturalNote::D, Accidental::Natural);
    pub const D_FLAT: Note = Note(NaturalNote::D, Accidental::Flat);
    pub const D_SHARP: Note = Note(NaturalNote::D, Accidental::Sharp);
    pub const E: Note = Note(NaturalNote::E, Accidental::Natural);
    pub const E_FLAT: Note = Note(NaturalNote::E, Accidental::Flat);
    pub const F: Note = Note(NaturalNote::F, Accidental::Natural);
    pub const F_SHARP: Note = Note(NaturalNote::F, Accidental::Sharp);
    pub const G: Note = Note(NaturalNote::G, Accidental::Natural);
    pub const G_FLAT: Note = Note(NaturalNote::G, Accidental::Flat);
    pub const G_SHARP: Note = Note(NaturalNote::G, Accidental::Sharp);

    /// Returns the semitone value of the note within an octave, in the range 0 to 11. Notes such
    /// as C♭ or B♯ wrap around the octave.
    #[must_use]
    pub fn semitone_class(&self) -> i32 {
        (self.0.semitone_class() + self.1.alter()).rem_euclid(SEMITONES_PER_OCTAVE)
    }

    /// Returns whether the note carries no accidental.
    #[must_use]
    pub fn is_natural(&self) -> bool {
        self.1 == Accidental::Natural
    }

    /// Returns the note for the given semitone class, spelling the black keys as requested. The
    /// class is reduced modulo 12 first.
    #[must_use]
    pub fn from_semitone_class(class: i32, spelling: Spelling) -> Note {
        match (class.rem_euclid(SEMITONES_PER_OCTAVE), spelling) {
            (0, _) => Note::C,
            (1, Spelling::Sharps) => Note::C_SHARP,
            (1, Spelling::Flats) => Note::D_FLAT,
            (2, _) => Note::D,
            (3, Spelling::Sharps) => Note::D_SHARP,
            (3, Spelling::Flats) => Note::E_FLAT,
            (4, _) => Note::E,
            (5, _) => Note::F,
            (6, Spelling::Sharps) => Note::F_SHARP,
            (6, Spelling::Flats) => Note::G_FLAT,
            (7, _) => Note::G,
            (8, Spelling::Sharps) => Note::G_SHARP,
            (8, Spelling::Flats) => Note::A_FLAT,
            (9, _) => Note::A,
            (10, Spelling::Sharps) => Note::A_SHARP,
            (10, Spelling::Flats) => Note::B_FLAT,
            _ => Note::B,
        }
    }

    /// Returns a representation of the note without Unicode characters, e.g. `C#` or `Db`. This
    /// is the spelling used in item IDs and in the note names received as guesses.
    #[must_use]
    pub fn to_ascii_string(&self) -> String {
        format!("{}{}", self.0, self.1.ascii_symbol())
    }
}

impl Display for Note {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}", self.0, self.1)
    }
}

/// A note qualified with its octave. Octaves follow scientific pitch notation, so middle C is
/// `C4` and the lowest key of a piano is `A0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(into = "String", try_from = "String")]
pub struct Pitch {
    /// The spelled pitch class.
    pub note: Note,

    /// The octave of the pitch.
    pub octave: i8,
}

impl Pitch {
    /// Creates a new pitch.
    #[must_use]
    pub const fn new(note: Note, octave: i8) -> Self {
        Self { note, octave }
    }

    /// Returns the semitone value of the pitch class, in the range 0 to 11.
    #[must_use]
    pub fn semitone_class(&self) -> i32 {
        self.note.semitone_class()
    }

    /// Returns the number of semitones between C0 and this pitch. Pitches with the same absolute
    /// semitone sound the same regardless of their spelling.
    #[must_use]
    pub fn absolute_semitone(&self) -> i32 {
        i32::from(self.octave) * SEMITONES_PER_OCTAVE + self.semitone_class()
    }

    /// Returns the pitch with the given absolute semitone. The octave is carried over as many
    /// times as needed when reducing the value modulo 12. Returns `None` if the octave does not
    /// fit the representation.
    #[must_use]
    pub fn from_absolute_semitone(semitone: i32, spelling: Spelling) -> Option<Self> {
        let octave = i8::try_from(semitone.div_euclid(SEMITONES_PER_OCTAVE)).ok()?;
        Some(Self {
            note: Note::from_semitone_class(semitone, spelling),
            octave,
        })
    }

    /// Returns whether the pitch carries no accidental.
    #[must_use]
    pub fn is_natural(&self) -> bool {
        self.note.is_natural()
    }
}

impl Display for Pitch {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}", self.note.to_ascii_string(), self.octave)
    }
}

impl FromStr for Pitch {
    type Err = PitchError;

    /// Parses pitches following the pattern `LETTER[#|b]OCTAVE`, e.g. `C4`, `F#3`, or `Bb-1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let natural = chars
            .next()
            .and_then(NaturalNote::from_letter)
            .ok_or_else(|| PitchError::InvalidLetter(s.to_string()))?;

        // The accidental is optional, so anything other than the start of the octave must be one.
        let rest = chars.as_str();
        let (accidental, octave_str) = match rest.chars().next() {
            Some('#') => (Accidental::Sharp, &rest[1..]),
            Some('b') => (Accidental::Flat, &rest[1..]),
            Some(c) if c == '-' || c.is_ascii_digit() => (Accidental::Natural, rest),
            Some(_) => return Err(PitchError::InvalidAccidental(s.to_string())),
            None => return Err(PitchError::InvalidOctave(s.to_string())),
        };

        // Only an optional minus sign followed by digits is accepted as the octave.
        let digits = octave_str.strip_prefix('-').unwrap_or(octave_str);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PitchError::InvalidOctave(s.to_string()));
        }
        let octave = octave_str
            .parse::<i8>()
            .map_err(|_| PitchError::InvalidOctave(s.to_string()))?;

        Ok(Pitch::new(Note(natural, accidental), octave))
    }
}

impl From<Pitch> for String {
    fn from(pitch: Pitch) -> Self {
        pitch.to_string()
    }
}

impl TryFrom<String> for Pitch {
    type Error = PitchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// An inclusive range of pitches compared by absolute semitone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PitchRange {
    /// The lowest pitch in the range.
    pub lowest: Pitch,

    /// The highest pitch in the range.
    pub highest: Pitch,
}

impl PitchRange {
    /// The range of a standard 88-key piano, from A0 to C8. No generated item ever leaves this
    /// range, regardless of the active settings.
    pub const PIANO: PitchRange = PitchRange {
        lowest: Pitch::new(Note::A, 0),
        highest: Pitch::new(Note::C, 8),
    };

    /// Returns whether the pitch lies within the range.
    #[must_use]
    pub fn contains(&self, pitch: &Pitch) -> bool {
        let semitone = pitch.absolute_semitone();
        self.lowest.absolute_semitone() <= semitone && semitone <= self.highest.absolute_semitone()
    }
}
