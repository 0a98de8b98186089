//! Defines how the results of the learner's guesses are recorded during a practice session.
//!
//! Every guess is recorded, right or wrong. The statistics keep the overall accuracy, the accuracy
//! on each pitch that appeared in a challenge, and a chronological history of the guesses. They are
//! kept in memory and reset at the start of every session. The spaced-repetition records are kept
//! separately in the items themselves.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::data::{
    Grade,
    music::{chords::identify_chord, notes::Pitch},
};

/// A single guess submitted by the learner.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// The ID of the item that was presented.
    pub item_id: Ustr,

    /// The name of the target, e.g. `A4` for a note or `Cmaj4` for a chord.
    pub target_label: String,

    /// The valid note names guessed by the learner, separated by commas.
    pub guess_label: String,

    /// Whether the guess was correct.
    pub correct: bool,

    /// The grade assigned to the item. Only set for correct guesses.
    pub grade: Option<Grade>,

    /// The time at which the guess was submitted.
    pub timestamp: DateTime<Utc>,
}

/// The number of correct guesses out of the total for a single pitch.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PitchStat {
    /// The number of correct guesses on challenges that included the pitch.
    pub correct: u32,

    /// The number of guesses on challenges that included the pitch.
    pub total: u32,
}

/// Contains functions to record and retrieve the results of the learner's guesses.
pub trait PracticeStats {
    /// Records a guess on a challenge with the given target notes.
    fn record_guess(
        &mut self,
        item_id: Ustr,
        target: &[Pitch],
        guesses: &[Pitch],
        correct: bool,
        grade: Option<Grade>,
        timestamp: DateTime<Utc>,
    );

    /// Returns the total number of guesses.
    fn total(&self) -> u32;

    /// Returns the number of correct guesses.
    fn correct(&self) -> u32;

    /// Returns the percentage of correct guesses, or zero if there are none.
    fn accuracy(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            f64::from(self.correct()) / f64::from(self.total()) * 100.0
        }
    }

    /// Returns the statistics of the pitch with the given name, e.g. `C#4`.
    fn pitch_stat(&self, pitch: &str) -> Option<PitchStat>;

    /// Returns all the guesses in the order in which they were submitted.
    fn history(&self) -> &[HistoryEntry];

    /// Removes all the recorded guesses.
    fn reset(&mut self);
}

/// An in-memory implementation of [PracticeStats].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct SessionStats {
    /// The total number of guesses.
    total: u32,

    /// The number of correct guesses.
    correct: u32,

    /// The statistics of each pitch, keyed by its ASCII name.
    pitches: BTreeMap<String, PitchStat>,

    /// The guesses in chronological order.
    history: Vec<HistoryEntry>,
}

impl SessionStats {
    /// Returns the label shown for the target of a challenge.
    fn target_label(target: &[Pitch]) -> String {
        identify_chord(target).map_or_else(String::new, |name| name.to_string())
    }

    /// Returns all the per-pitch statistics.
    #[must_use]
    pub fn pitch_stats(&self) -> &BTreeMap<String, PitchStat> {
        &self.pitches
    }
}

impl PracticeStats for SessionStats {
    fn record_guess(
        &mut self,
        item_id: Ustr,
        target: &[Pitch],
        guesses: &[Pitch],
        correct: bool,
        grade: Option<Grade>,
        timestamp: DateTime<Utc>,
    ) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }

        for pitch in target {
            let stat = self.pitches.entry(pitch.to_string()).or_default();
            stat.total += 1;
            if correct {
                stat.correct += 1;
            }
        }

        let guess_label = guesses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        self.history.push(HistoryEntry {
            item_id,
            target_label: Self::target_label(target),
            guess_label,
            correct,
            grade,
            timestamp,
        });
    }

    fn total(&self) -> u32 {
        self.total
    }

    fn correct(&self) -> u32 {
        self.correct
    }

    fn pitch_stat(&self, pitch: &str) -> Option<PitchStat> {
        self.pitches.get(pitch).copied()
    }

    fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod test {
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::music::notes::Note;

    /// Verifies the totals, the per-pitch statistics, and the history after a few guesses.
    #[test]
    fn record_guesses() {
        let now = Utc::now();
        let mut stats = SessionStats::default();
        assert_eq!(stats.accuracy(), 0.0);

        let a4 = vec![Pitch::new(Note::A, 4)];
        stats.record_guess(
            Ustr::from("note-A4"),
            &a4,
            &[Pitch::new(Note::G, 4)],
            false,
            None,
            now,
        );
        stats.record_guess(
            Ustr::from("note-A4"),
            &a4,
            &a4,
            true,
            Some(Grade::Hard),
            now + Duration::seconds(3),
        );

        let chord = vec![
            Pitch::new(Note::C, 4),
            Pitch::new(Note::E, 4),
            Pitch::new(Note::G, 4),
        ];
        stats.record_guess(
            Ustr::from("chord-C4-E4-G4"),
            &chord,
            &chord,
            true,
            Some(Grade::Easy),
            now + Duration::seconds(4),
        );

        assert_eq!(stats.total(), 3);
        assert_eq!(stats.correct(), 2);
        assert!((stats.accuracy() - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(
            stats.pitch_stat("A4"),
            Some(PitchStat {
                correct: 1,
                total: 2
            })
        );
        assert_eq!(
            stats.pitch_stat("E4"),
            Some(PitchStat {
                correct: 1,
                total: 1
            })
        );
        assert_eq!(stats.pitch_stat("B4"), None);

        let history = stats.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].target_label, "A4");
        assert_eq!(history[0].guess_label, "G4");
        assert_eq!(history[0].grade, None);
        assert_eq!(history[2].target_label, "Cmaj4");
        assert_eq!(history[2].guess_label, "C4, E4, G4");
        assert_eq!(history[2].grade, Some(Grade::Easy));
    }

    /// Verifies that resetting the statistics removes every recorded guess.
    #[test]
    fn reset() {
        let mut stats = SessionStats::default();
        let a4 = vec![Pitch::new(Note::A, 4)];
        stats.record_guess(Ustr::from("note-A4"), &a4, &a4, true, None, Utc::now());
        stats.reset();
        assert_eq!(stats, SessionStats::default());
        assert!(stats.history().is_empty());
    }
}
