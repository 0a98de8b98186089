//! Contains utilities common to notedrill tests.
//!
//! This module contains helpers to build item pools in a given state, a scheduling algorithm with
//! fixed intervals whose results are easy to predict, and a simulated learner used by the
//! end-to-end tests to answer challenges with a given accuracy and speed.

use chrono::{DateTime, Duration, Utc};

use crate::{
    PracticeSession,
    data::{
        Grade, Item, ItemState, ReviewRecord,
        music::{
            chords::ChordQuality,
            notes::{Note, Pitch, Spelling},
        },
    },
    error::SessionError,
    grader::GuessFeedback,
    lifecycle::SchedulingAlgorithm,
};

/// Returns an item for the given answer with the given state and due timestamp. The content is
/// left empty.
#[must_use]
pub fn item_with_state(answer: Vec<Pitch>, state: ItemState, due: DateTime<Utc>) -> Item {
    let mut item = Item::new(answer, String::new(), due);
    item.record.state = state;
    item.record.due = due;
    item
}

/// Returns a single-note item with the given state and due timestamp.
#[must_use]
pub fn note_item(note: Note, octave: i8, state: ItemState, due: DateTime<Utc>) -> Item {
    item_with_state(vec![Pitch::new(note, octave)], state, due)
}

/// Returns the notes of the triad of the given quality built on the root. Black keys are spelled
/// with sharps.
#[must_use]
pub fn triad(root: Pitch, quality: ChordQuality) -> Vec<Pitch> {
    quality
        .offsets()
        .iter()
        .filter_map(|offset| {
            Pitch::from_absolute_semitone(root.absolute_semitone() + offset, Spelling::Sharps)
        })
        .collect()
}

/// Returns a chord item for the triad of the given quality with the given state and due timestamp.
#[must_use]
pub fn chord_item(
    root: Pitch,
    quality: ChordQuality,
    state: ItemState,
    due: DateTime<Utc>,
) -> Item {
    item_with_state(triad(root, quality), state, due)
}

/// Returns the seven natural notes of the given octave as items in the review state, due at the
/// given time.
#[must_use]
pub fn naturals_in_review(octave: i8, due: DateTime<Utc>) -> Vec<Item> {
    [Note::C, Note::D, Note::E, Note::F, Note::G, Note::A, Note::B]
        .into_iter()
        .map(|note| note_item(note, octave, ItemState::Review, due))
        .collect()
}

/// A scheduling algorithm that sends every graded item to review after a fixed interval,
/// regardless of the grade. Useful to make the due timestamps of a simulation predictable.
pub struct FixedIntervalAlgorithm {
    /// The delay between the grade and the next review.
    pub interval: Duration,
}

impl SchedulingAlgorithm for FixedIntervalAlgorithm {
    fn advance(&self, record: &ReviewRecord, _grade: Grade, now: DateTime<Utc>) -> ReviewRecord {
        ReviewRecord {
            state: ItemState::Review,
            due: now + self.interval,
            params: record.params.clone(),
        }
    }
}

/// A simulated learner that answers the challenges of a practice session.
pub struct SimulatedLearner {
    /// The number of wrong guesses made before every correct answer.
    pub wrong_guesses: u32,

    /// The time taken to answer every guess.
    pub response_time: Duration,
}

impl SimulatedLearner {
    /// Answers the current challenge of the session, starting at the given time. Returns the
    /// feedback for the final, correct guess and the time at which it was submitted.
    pub fn answer(
        &self,
        session: &mut PracticeSession,
        start: DateTime<Utc>,
    ) -> Result<(GuessFeedback, DateTime<Utc>), SessionError> {
        let answer: Vec<String> = session
            .current_challenge()
            .ok_or(SessionError::NoActiveChallenge)?
            .answer
            .iter()
            .map(ToString::to_string)
            .collect();

        let mut now = start;
        for _ in 0..self.wrong_guesses {
            now += self.response_time;
            session.submit_guess(&["X9"], now)?;
        }
        now += self.response_time;
        let feedback = session.submit_guess(&answer, now)?;
        Ok((feedback, now))
    }
}
