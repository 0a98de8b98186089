//! notedrill is an adaptive practice scheduler for drills in which a learner reads notes and chords
//! and answers by playing them. It is based on the principles of spaced repetition.
//!
//! Given a pool of drill items and a set of constraints (octave range, allowed accidentals, and
//! whether single notes or chords of certain qualities are drilled), notedrill decides which item
//! to present next. Items that are due for review come first, then items that were queued but
//! never seen, and when neither is available a new note or chord that satisfies the constraints is
//! generated at random. The learner's guesses are verified against the target, and a correct
//! answer is graded from how long it took and how many wrong guesses preceded it. The grade is fed
//! back to a spaced-repetition algorithm that decides when the item should be seen again.
//!
//! The library is synchronous and keeps no global state. All the state of a learner's practice is
//! owned by a [PracticeSession], which the host application can serialize and restore as it sees
//! fit.

pub mod data;
pub mod error;
pub mod generator;
pub mod grader;
pub mod lifecycle;
pub mod practice_stats;
pub mod renderer;
pub mod scheduler;
pub mod testutil;

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::{
    data::{
        Challenge, Grade, Item, ItemKind, PracticeMode, Provenance, Settings,
        music::notes::{Note, Pitch},
    },
    error::SessionError,
    grader::{AttemptTracker, GuessFeedback, parse_guesses, verify_pitches},
    lifecycle::{IntervalAlgorithm, SchedulingAlgorithm},
    practice_stats::{PracticeStats, SessionStats},
    renderer::{MusicXmlRenderer, Renderer, StaffLayout},
    scheduler::{ChallengeScheduler, TieredScheduler},
};

/// The lowest octave of the single-note items accepted when importing a pool.
const MIN_IMPORTED_OCTAVE: i8 = 0;

/// The highest octave of the single-note items accepted when importing a pool.
const MAX_IMPORTED_OCTAVE: i8 = 8;

/// The practice state of a single learner. It owns the pool of items, the active settings, the
/// challenge being answered, and the statistics of the session, and it drives the selection,
/// verification, and grading of the challenges.
pub struct PracticeSession {
    /// The pool of items. No two items in the pool share the same ID.
    items: Vec<Item>,

    /// The constraints applied when selecting and generating items.
    settings: Settings,

    /// The scheduler used to select the next challenge.
    scheduler: Box<dyn ChallengeScheduler>,

    /// The algorithm used to update the review records of the graded items.
    algorithm: Box<dyn SchedulingAlgorithm>,

    /// The challenge being answered, if any.
    current: Option<Challenge>,

    /// The clock and the wrong-attempt counter of the current challenge.
    tracker: AttemptTracker,

    /// The results of the guesses submitted during the session.
    stats: SessionStats,
}

impl PracticeSession {
    /// Creates a new session with the given pool and settings, using the default scheduler and
    /// scheduling algorithm. If the pool has items with the same ID, only the first one is kept.
    #[must_use]
    pub fn new(items: Vec<Item>, settings: Settings) -> Self {
        let mut session = Self {
            items: Vec::with_capacity(items.len()),
            settings,
            scheduler: Box::new(TieredScheduler::new()),
            algorithm: Box::new(IntervalAlgorithm::default()),
            current: None,
            tracker: AttemptTracker::new(Utc::now()),
            stats: SessionStats::default(),
        };
        for item in items {
            session.register(item);
        }
        session
    }

    /// Replaces the scheduling algorithm used to update the review records.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: Box<dyn SchedulingAlgorithm>) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Replaces the scheduler used to select the challenges.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Box<dyn ChallengeScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Returns the pool given to learners who have not practiced yet: a single new item for middle
    /// C.
    #[must_use]
    pub fn starter_items(now: DateTime<Utc>) -> Vec<Item> {
        let answer = vec![Pitch::new(Note::C, 4)];
        let content = MusicXmlRenderer::default().render(&answer, StaffLayout::Grand);
        vec![Item::new(answer, content, now)]
    }

    /// Adds the item to the pool unless an item with the same ID is already in it. Returns whether
    /// the item was added.
    fn register(&mut self, item: Item) -> bool {
        if self.items.iter().any(|existing| existing.id == item.id) {
            debug!("item {} is already in the pool", item.id);
            return false;
        }
        self.items.push(item);
        true
    }

    /// Starts a new session by clearing the statistics and selecting the first challenge.
    pub fn start(&mut self, now: DateTime<Utc>) -> &Challenge {
        self.stats.reset();
        self.tracker = AttemptTracker::new(now);
        self.next_challenge(now)
    }

    /// Selects the next challenge and makes it the active one. Generated items are added to the
    /// pool. The clock and the wrong-attempt counter are reset.
    pub fn next_challenge(&mut self, now: DateTime<Utc>) -> &Challenge {
        let challenge = self
            .scheduler
            .next_challenge(&self.items, &self.settings, now);
        if challenge.provenance == Provenance::New {
            self.register(challenge.item.clone());
        }
        self.tracker.reset(now);
        self.current.insert(challenge)
    }

    /// Submits the learner's guess for the active challenge. Malformed note names are ignored. A
    /// wrong guess leaves the challenge active. A correct guess is graded, the grade is applied to
    /// the item in the pool, and the next challenge becomes active.
    pub fn submit_guess<S: AsRef<str>>(
        &mut self,
        guesses: &[S],
        now: DateTime<Utc>,
    ) -> Result<GuessFeedback, SessionError> {
        let challenge = self
            .current
            .as_ref()
            .ok_or(SessionError::NoActiveChallenge)?;
        let guessed = parse_guesses(guesses);
        let correct = verify_pitches(&challenge.answer, &guessed);
        let grade = self.tracker.record_guess(correct, now);
        let item_id = challenge.item.id;
        self.stats
            .record_guess(item_id, &challenge.answer, &guessed, correct, grade, now);

        let feedback = GuessFeedback {
            item_id,
            correct,
            grade,
            wrong_attempts: self.tracker.wrong_attempts(),
        };
        if let Some(grade) = grade {
            if let Some(challenge) = self.current.take() {
                self.apply_grade(challenge.item, grade, now);
            }
            self.next_challenge(now);
        }
        Ok(feedback)
    }

    /// Applies the grade to the pooled item with the same ID as the given one. The item is added to
    /// the pool first if it's missing.
    fn apply_grade(&mut self, item: Item, grade: Grade, now: DateTime<Utc>) {
        let index = match self.items.iter().position(|existing| existing.id == item.id) {
            Some(index) => index,
            None => {
                self.items.push(item);
                self.items.len() - 1
            }
        };
        self.items[index].apply_grade(self.algorithm.as_ref(), grade, now);
    }

    /// Stops the clock of the active challenge.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        self.tracker.pause(now);
    }

    /// Ends the session. The clock is stopped and the active challenge is dropped without a grade,
    /// so guesses are rejected until the session is started again.
    pub fn stop(&mut self, now: DateTime<Utc>) {
        self.tracker.pause(now);
        if let Some(challenge) = self.current.take() {
            info!("stopped the session on item {}", challenge.item.id);
        }
    }

    /// Returns whether a challenge is waiting for the learner's guess.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Restarts the clock of the active challenge.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        self.tracker.resume(now);
    }

    /// Returns whether the clock is stopped.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.tracker.is_paused()
    }

    /// Returns the number of seconds spent on the active challenge, excluding the time paused.
    #[must_use]
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> f64 {
        self.tracker.elapsed_seconds(now)
    }

    /// Returns the number of wrong guesses made on the active challenge.
    #[must_use]
    pub fn wrong_attempts(&self) -> u32 {
        self.tracker.wrong_attempts()
    }

    /// Replaces the active settings. They are used from the next selection on.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Applies the preset of the given practice mode to the active settings.
    pub fn apply_mode(&mut self, mode: PracticeMode) {
        info!("switching to practice mode {mode}");
        self.settings.apply_mode(mode);
    }

    /// Returns the active settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the pool of items.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Returns the challenge being answered, if any.
    #[must_use]
    pub fn current_challenge(&self) -> Option<&Challenge> {
        self.current.as_ref()
    }

    /// Returns the statistics of the session.
    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Clears the statistics of the session without touching the pool.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Serializes the pool of items as JSON.
    pub fn export_items(&self) -> Result<String, SessionError> {
        serde_json::to_string(&self.items).map_err(SessionError::ExportItems)
    }

    /// Replaces the pool with the items serialized in the given JSON. The ID of every item is
    /// derived again from its answer, so stored IDs are ignored. Single-note items outside the range
    /// of supported octaves are dropped, as are items whose ID is already in the pool. Returns the
    /// number of items in the new pool.
    pub fn import_items(&mut self, json: &str) -> Result<usize, SessionError> {
        let imported: Vec<Item> = serde_json::from_str(json).map_err(SessionError::ImportItems)?;
        self.items.clear();
        for mut item in imported {
            item.id = Item::id_for_answer(&item.answer);
            if Self::is_legacy_item(&item) {
                debug!("dropping item {} with an unsupported octave", item.id);
                continue;
            }
            self.register(item);
        }
        info!("imported {} items", self.items.len());
        Ok(self.items.len())
    }

    /// Returns whether the item is a single note outside the range of supported octaves.
    fn is_legacy_item(item: &Item) -> bool {
        item.kind() == ItemKind::Note
            && item.answer.iter().any(|pitch| {
                !(MIN_IMPORTED_OCTAVE..=MAX_IMPORTED_OCTAVE).contains(&pitch.octave)
            })
    }
}
