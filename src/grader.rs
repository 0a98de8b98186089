//! Contains the logic to verify the learner's guesses and to turn their performance on a challenge
//! into a grade.
//!
//! Guesses are compared by absolute semitone, so the order of the notes, repeated notes, and the
//! spelling of black keys do not matter. A correct guess is graded from the time taken since the
//! challenge was presented and the number of wrong guesses made before it. Both are tracked per
//! challenge by the [AttemptTracker].

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use log::debug;
use ustr::Ustr;

use crate::data::{Grade, music::notes::Pitch};

/// The number of seconds added to the score of a challenge for each wrong guess.
const WRONG_ATTEMPT_PENALTY: f64 = 5.0;

/// The feedback returned after the learner submits a guess.
#[derive(Clone, Debug, PartialEq)]
pub struct GuessFeedback {
    /// The ID of the item that was answered.
    pub item_id: Ustr,

    /// Whether the guess was correct.
    pub correct: bool,

    /// The grade assigned to the item. Only set for correct guesses.
    pub grade: Option<Grade>,

    /// The number of wrong guesses made on the challenge so far, including this one if it was
    /// wrong.
    pub wrong_attempts: u32,
}

/// Parses the given note names into pitches. Malformed names are dropped.
pub fn parse_guesses<S: AsRef<str>>(guesses: &[S]) -> Vec<Pitch> {
    guesses
        .iter()
        .filter_map(|guess| match guess.as_ref().trim().parse::<Pitch>() {
            Ok(pitch) => Some(pitch),
            Err(err) => {
                debug!("dropping malformed guess: {err}");
                None
            }
        })
        .collect()
}

/// Returns the set of absolute semitones of the given pitches.
fn semitone_set(pitches: &[Pitch]) -> BTreeSet<i32> {
    pitches.iter().map(Pitch::absolute_semitone).collect()
}

/// Returns whether the guessed pitches sound exactly the notes of the answer.
#[must_use]
pub fn verify_pitches(answer: &[Pitch], guesses: &[Pitch]) -> bool {
    !guesses.is_empty() && semitone_set(answer) == semitone_set(guesses)
}

/// Returns whether the given note names sound exactly the notes of the answer. Malformed names are
/// ignored, and a guess with no valid names is always wrong.
pub fn verify<S: AsRef<str>>(answer: &[Pitch], guesses: &[S]) -> bool {
    verify_pitches(answer, &parse_guesses(guesses))
}

/// Returns the grade of a correct answer given in the given number of seconds after the given
/// number of wrong guesses.
#[must_use]
pub fn grade_performance(elapsed_seconds: f64, wrong_attempts: u32) -> Grade {
    let score = elapsed_seconds + WRONG_ATTEMPT_PENALTY * f64::from(wrong_attempts);
    if score < 2.0 {
        Grade::Easy
    } else if score < 5.0 {
        Grade::Good
    } else if score < 10.0 {
        Grade::Hard
    } else {
        Grade::Again
    }
}

/// Tracks the time spent on and the wrong guesses made on the active challenge.
#[derive(Clone, Debug, PartialEq)]
pub struct AttemptTracker {
    /// The moment the active challenge was presented.
    started_at: DateTime<Utc>,

    /// The number of wrong guesses made on the active challenge.
    wrong_attempts: u32,

    /// The moment the clock was paused, if it's paused.
    paused_at: Option<DateTime<Utc>>,

    /// The total time the clock was paused since the challenge was presented.
    paused_total: Duration,
}

impl AttemptTracker {
    /// Creates a tracker for a challenge presented at the given time.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            started_at: now,
            wrong_attempts: 0,
            paused_at: None,
            paused_total: Duration::zero(),
        }
    }

    /// Resets the clock and the wrong-attempt counter for a new challenge. A paused tracker stays
    /// paused.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        let paused = self.is_paused();
        *self = Self::new(now);
        if paused {
            self.paused_at = Some(now);
        }
    }

    /// Stops the clock. Does nothing if it's already stopped.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    /// Restarts the clock. Does nothing if it's running.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += (now - paused_at).max(Duration::zero());
        }
    }

    /// Returns whether the clock is stopped.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Returns the number of wrong guesses made on the active challenge.
    #[must_use]
    pub fn wrong_attempts(&self) -> u32 {
        self.wrong_attempts
    }

    /// Returns the number of seconds spent on the active challenge, excluding the time paused.
    #[must_use]
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> f64 {
        let until = self.paused_at.unwrap_or(now);
        let elapsed = (until - self.started_at - self.paused_total).max(Duration::zero());
        elapsed.num_milliseconds() as f64 / 1000.0
    }

    /// Records a guess. Wrong guesses increment the counter and return `None`. Correct guesses
    /// return the grade of the performance.
    pub fn record_guess(&mut self, correct: bool, now: DateTime<Utc>) -> Option<Grade> {
        if correct {
            Some(grade_performance(
                self.elapsed_seconds(now),
                self.wrong_attempts,
            ))
        } else {
            self.wrong_attempts += 1;
            None
        }
    }
}
