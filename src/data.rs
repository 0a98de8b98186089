//! Defines the basic data structures used by notedrill to describe the drill items, their review
//! records, the settings that constrain which items are presented, and the challenges returned by
//! the scheduler.
//!
//! Every type in this module can be serialized, so that the host application can store the item
//! pool and the settings in whatever form it prefers. The only requirement placed on the host is
//! that `due` timestamps are restored as timestamps, which `chrono`'s serde support ensures.

pub mod music;

use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter, EnumString};
use ustr::Ustr;

use crate::data::music::{
    chords::ChordQuality,
    notes::{Accidental, Pitch, Spelling},
};

/// The prefix of the IDs of single-note items.
pub const NOTE_ID_PREFIX: &str = "note-";

/// The prefix of the IDs of chord items.
pub const CHORD_ID_PREFIX: &str = "chord-";

/// The grade assigned to a correct answer, derived from how long the learner took and how many
/// wrong guesses they made before answering correctly. Grades are ordered from worst to best.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Grade {
    /// The item was effectively forgotten and must be relearned.
    Again,

    /// The item was recalled with significant effort.
    Hard,

    /// The item was recalled after a short hesitation.
    Good,

    /// The item was recalled immediately.
    Easy,
}

impl Grade {
    /// Assigns a numeric value between 1 and 4 to each grade.
    #[must_use]
    pub fn value(&self) -> u8 {
        match self {
            Grade::Again => 1,
            Grade::Hard => 2,
            Grade::Good => 3,
            Grade::Easy => 4,
        }
    }
}

/// The lifecycle state of an item's review record.
#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemState {
    /// The item has never been reviewed. New items are presented in the order they were added and
    /// their due timestamp is never consulted.
    #[default]
    New,

    /// The item has been reviewed but has not yet graduated to long-term review.
    Learning,

    /// The item is in long-term review.
    Review,
}

/// The spaced-repetition record of an item. The scheduler only reads the state and the due
/// timestamp. The parameters are owned by the scheduling algorithm and are opaque to the rest of
/// the library.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ReviewRecord {
    /// The current state of the item.
    pub state: ItemState,

    /// The moment at or after which the item becomes eligible for review. Only meaningful if the
    /// state is not [ItemState::New].
    pub due: DateTime<Utc>,

    /// The parameters accumulated by the scheduling algorithm.
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

impl ReviewRecord {
    /// Returns the record of an item that has never been reviewed.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: ItemState::New,
            due: now,
            params: BTreeMap::new(),
        }
    }

    /// Returns whether the item is due for review at the given time. New items are never due.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.state != ItemState::New && self.due <= now
    }
}

/// The type of content drilled by an item.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemKind {
    /// A single note.
    Note,

    /// Two or more notes sounding at once.
    Chord,
}

/// A drill unit, either a single note or a chord, along with its review record.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Item {
    /// The ID of the item, which is a pure function of its answer. See [Item::id_for_answer].
    pub id: Ustr,

    /// The rendered content shown to the learner. The content is opaque to the library and is
    /// regenerated from the answer every time the item is selected.
    pub content: String,

    /// The notes the learner must play to answer the item correctly.
    pub answer: Vec<Pitch>,

    /// The spaced-repetition record of the item.
    pub record: ReviewRecord,
}

impl Item {
    /// Creates a new item that has never been reviewed.
    #[must_use]
    pub fn new(answer: Vec<Pitch>, content: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Self::id_for_answer(&answer),
            content,
            answer,
            record: ReviewRecord::new(now),
        }
    }

    /// Returns the ID of an item with the given answer. Single notes are identified by their name
    /// (e.g. `note-C#4`) and chords by the names of their notes sorted by pitch (e.g.
    /// `chord-C4-E4-G4`), so the same answer always maps to the same ID.
    #[must_use]
    pub fn id_for_answer(answer: &[Pitch]) -> Ustr {
        if let [pitch] = answer {
            return Ustr::from(&format!("{NOTE_ID_PREFIX}{pitch}"));
        }

        let mut sorted = answer.to_vec();
        sorted.sort_by_cached_key(|p| (p.absolute_semitone(), p.to_string()));
        let names: Vec<String> = sorted.iter().map(ToString::to_string).collect();
        Ustr::from(&format!("{CHORD_ID_PREFIX}{}", names.join("-")))
    }

    /// Returns whether the item drills a single note or a chord.
    #[must_use]
    pub fn kind(&self) -> ItemKind {
        if self.answer.len() == 1 {
            ItemKind::Note
        } else {
            ItemKind::Chord
        }
    }
}

/// The reason why an item was chosen as the next challenge.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Provenance {
    /// The item was generated during this selection and has never been seen.
    New,

    /// The item was already known and is presented for review.
    Review,

    /// The item was queued as new and is presented for the first time.
    Learn,
}

/// The result of a single selection: the item to present and the reason it was chosen.
#[derive(Clone, Debug, PartialEq)]
pub struct Challenge {
    /// The item to present, with freshly rendered content.
    pub item: Item,

    /// The reason why the item was selected.
    pub provenance: Provenance,

    /// The notes the learner must play. Equal to the item's answer.
    pub answer: Vec<Pitch>,
}

impl Challenge {
    /// Creates a challenge for the given item.
    #[must_use]
    pub fn new(item: Item, provenance: Provenance) -> Self {
        let answer = item.answer.clone();
        Self {
            item,
            provenance,
            answer,
        }
    }
}

/// The presets of the two practice modes offered to the learner.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumIter, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PracticeMode {
    /// Single notes between C2 and B6.
    SingleNotes,

    /// Major and minor triads in octaves 4 and 5.
    Chords,
}

/// The constraints applied when selecting and generating items. The settings are supplied by the
/// host on every selection, and the library keeps no copy of them between calls.
#[derive(Builder, Clone, Debug, Deserialize, PartialEq, Serialize)]
#[builder(default)]
#[serde(default)]
pub struct Settings {
    /// The lowest octave from which notes can be drawn, inclusive.
    pub min_octave: i8,

    /// The highest octave from which notes can be drawn, inclusive.
    pub max_octave: i8,

    /// Whether notes spelled with sharps can be presented.
    pub include_sharps: bool,

    /// Whether notes spelled with flats can be presented.
    pub include_flats: bool,

    /// Whether single-note items can be presented.
    pub enable_single_notes: bool,

    /// The qualities of the chords that can be presented. Chords are disabled if empty.
    #[builder(setter(into))]
    pub chord_qualities: Vec<ChordQuality>,
}

impl Default for Settings {
    /// Returns the settings of the single notes practice mode with all accidentals enabled.
    fn default() -> Self {
        Settings {
            min_octave: 2,
            max_octave: 6,
            include_sharps: true,
            include_flats: true,
            enable_single_notes: true,
            chord_qualities: vec![],
        }
    }
}

impl Settings {
    /// Returns the default settings for the given practice mode.
    #[must_use]
    pub fn for_mode(mode: PracticeMode) -> Self {
        let mut settings = Settings::default();
        settings.apply_mode(mode);
        settings
    }

    /// Overwrites the octave range and the enabled content with the preset of the given practice
    /// mode. The accidental flags are left untouched.
    pub fn apply_mode(&mut self, mode: PracticeMode) {
        match mode {
            PracticeMode::SingleNotes => {
                self.min_octave = 2;
                self.max_octave = 6;
                self.enable_single_notes = true;
                self.chord_qualities = vec![];
            }
            PracticeMode::Chords => {
                self.min_octave = 4;
                self.max_octave = 5;
                self.enable_single_notes = false;
                self.chord_qualities = vec![ChordQuality::Major, ChordQuality::Minor];
            }
        }
    }

    /// Returns whether any chord quality is enabled.
    #[must_use]
    pub fn chords_enabled(&self) -> bool {
        !self.chord_qualities.is_empty()
    }

    /// Returns the spelling used for black keys, or `None` if no accidentals are allowed. Sharps
    /// are preferred when both kinds of accidentals are enabled.
    #[must_use]
    pub fn spelling(&self) -> Option<Spelling> {
        if self.include_sharps {
            Some(Spelling::Sharps)
        } else if self.include_flats {
            Some(Spelling::Flats)
        } else {
            None
        }
    }

    /// Returns whether the given octave lies within the configured range.
    #[must_use]
    pub fn allows_octave(&self, octave: i8) -> bool {
        self.min_octave <= octave && octave <= self.max_octave
    }

    /// Returns whether the accidental of the pitch is enabled. Naturals are always allowed.
    #[must_use]
    pub fn allows_accidental(&self, pitch: &Pitch) -> bool {
        match pitch.note.1 {
            Accidental::Natural => true,
            Accidental::Sharp => self.include_sharps,
            Accidental::Flat => self.include_flats,
        }
    }

    /// Returns whether the pitch satisfies both the octave range and the accidental settings.
    #[must_use]
    pub fn allows_pitch(&self, pitch: &Pitch) -> bool {
        self.allows_octave(pitch.octave) && self.allows_accidental(pitch)
    }
}

#[cfg(test)]
mod test {
    use anyhow::Result;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::data::music::notes::Note;

    /// Verifies the numeric values and the ordering of the grades.
    #[test]
    fn grade_value_and_order() {
        let values: Vec<u8> = Grade::iter().map(|grade| grade.value()).collect();
        assert_eq!(values, vec![1, 2, 3, 4]);
        assert!(Grade::iter().collect::<Vec<_>>().is_sorted());
        assert!(Grade::Again < Grade::Hard);
        assert!(Grade::Good < Grade::Easy);
    }

    /// Verifies that item IDs only depend on the answer.
    #[test]
    fn id_for_answer() {
        let note = vec![Pitch::new(Note::C_SHARP, 4)];
        assert_eq!(Item::id_for_answer(&note).as_str(), "note-C#4");

        let chord = vec![
            Pitch::new(Note::G, 4),
            Pitch::new(Note::C, 4),
            Pitch::new(Note::E, 4),
        ];
        assert_eq!(Item::id_for_answer(&chord).as_str(), "chord-C4-E4-G4");

        let now = Utc::now();
        let first = Item::new(chord.clone(), "a".to_string(), now);
        let second = Item::new(chord, "b".to_string(), now + Duration::days(1));
        assert_eq!(first.id, second.id);
        assert_eq!(first.kind(), ItemKind::Chord);
    }

    /// Verifies that new records are never due and that other records are due once their due
    /// timestamp is reached.
    #[test]
    fn record_is_due() {
        let now = Utc::now();
        let mut record = ReviewRecord::new(now - Duration::days(1));
        assert!(!record.is_due(now));

        record.state = ItemState::Review;
        assert!(record.is_due(now));
        record.due = now;
        assert!(record.is_due(now));
        record.due = now + Duration::seconds(1);
        assert!(!record.is_due(now));
    }

    /// Verifies that items survive a round trip through JSON with their due timestamp intact.
    #[test]
    fn item_serde() -> Result<()> {
        let now = Utc::now();
        let mut item = Item::new(vec![Pitch::new(Note::B_FLAT, 3)], String::new(), now);
        item.record.state = ItemState::Learning;
        item.record.params.insert("ease".to_string(), 2.5);

        let json = serde_json::to_string(&item)?;
        let restored: Item = serde_json::from_str(&json)?;
        assert_eq!(restored, item);
        assert!(restored.record.due <= now);
        Ok(())
    }

    /// Verifies the practice mode presets.
    #[test]
    fn mode_presets() {
        // Every mode drills either single notes or chords, never both.
        for mode in PracticeMode::iter() {
            let settings = Settings::for_mode(mode);
            assert_ne!(settings.enable_single_notes, settings.chords_enabled(), "{mode}");
        }

        let chords = Settings::for_mode(PracticeMode::Chords);
        assert_eq!(chords.min_octave, 4);
        assert_eq!(chords.max_octave, 5);
        assert!(!chords.enable_single_notes);
        assert_eq!(
            chords.chord_qualities,
            vec![ChordQuality::Major, ChordQuality::Minor]
        );

        let mut notes = SettingsBuilder::default()
            .include_flats(false)
            .build()
            .unwrap();
        notes.apply_mode(PracticeMode::SingleNotes);
        assert_eq!(notes.min_octave, 2);
        assert_eq!(notes.max_octave, 6);
        assert!(!notes.include_flats);
        assert!(!notes.chords_enabled());
    }

    /// Verifies the pitch checks and the choice of spelling.
    #[test]
    fn settings_allow_pitch() {
        let settings = SettingsBuilder::default()
            .min_octave(3)
            .max_octave(4)
            .include_sharps(false)
            .build()
            .unwrap();
        assert!(settings.allows_pitch(&Pitch::new(Note::C, 3)));
        assert!(settings.allows_pitch(&Pitch::new(Note::D_FLAT, 4)));
        assert!(!settings.allows_pitch(&Pitch::new(Note::C_SHARP, 4)));
        assert!(!settings.allows_pitch(&Pitch::new(Note::C, 5)));
        assert_eq!(settings.spelling(), Some(Spelling::Flats));

        let naturals = Settings {
            include_sharps: false,
            include_flats: false,
            ..Settings::default()
        };
        assert_eq!(naturals.spelling(), None);
    }

    /// Verifies that missing fields are filled in with their defaults when deserializing settings.
    #[test]
    fn settings_serde_defaults() -> Result<()> {
        let settings: Settings =
            serde_json::from_str(r#"{"min_octave": 3, "chord_qualities": ["augmented"]}"#)?;
        assert_eq!(settings.min_octave, 3);
        assert_eq!(settings.max_octave, 6);
        assert_eq!(settings.chord_qualities, vec![ChordQuality::Augmented]);
        Ok(())
    }
}
