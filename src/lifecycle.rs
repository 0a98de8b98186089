//! Defines the lifecycle of an item's review record and the interface to the spaced-repetition
//! algorithm that drives it.
//!
//! Items start in the [ItemState::New] state. Once graded, the record is handed to a
//! [SchedulingAlgorithm], which returns the updated record with its new state and due timestamp.
//! The rest of the library never performs any scheduling math and only reads the state and the due
//! timestamp of the records.
//!
//! A default algorithm based on SM-2 is provided so that the library can be used on its own. Hosts
//! that prefer another algorithm only need to implement the trait.

use chrono::{DateTime, Duration, Utc};
use log::info;

use crate::data::{Grade, Item, ItemState, ReviewRecord};

/// The key of the ease factor in the parameters of a review record.
const EASE_PARAM: &str = "ease";

/// The key of the current interval, in days, in the parameters of a review record.
const INTERVAL_PARAM: &str = "interval_days";

/// The key of the number of reviews in the parameters of a review record.
const REPS_PARAM: &str = "reps";

/// The key of the number of lapses in the parameters of a review record.
const LAPSES_PARAM: &str = "lapses";

/// The interface to a spaced-repetition algorithm. Implementations must be pure: the updated
/// record only depends on the given record, grade, and time.
pub trait SchedulingAlgorithm {
    /// Returns the record that results from grading an item with the given record at time `now`.
    fn advance(&self, record: &ReviewRecord, grade: Grade, now: DateTime<Utc>) -> ReviewRecord;
}

/// An implementation of [SchedulingAlgorithm] based on SM-2. Items in the learning state are
/// repeated after a few minutes until they are answered with at least a good grade, at which point
/// they graduate to review. Review intervals grow with the ease factor, which is adjusted after
/// every review and never drops below a minimum.
#[derive(Clone, Debug)]
pub struct IntervalAlgorithm {
    /// The ease factor assigned to items on their first review.
    pub initial_ease: f64,

    /// The lowest value the ease factor can take.
    pub minimum_ease: f64,

    /// The extra multiplier applied to the interval of easy reviews.
    pub easy_bonus: f64,

    /// The multiplier applied to the interval of hard reviews.
    pub hard_multiplier: f64,

    /// The interval in days assigned to items that graduate with a good grade.
    pub graduating_interval: f64,

    /// The interval in days assigned to items that graduate with an easy grade.
    pub easy_interval: f64,

    /// The longest interval in days between two reviews.
    pub maximum_interval: f64,

    /// The delay before showing again an item in the learning state that was answered with an
    /// again grade.
    pub again_step: Duration,

    /// The delay before showing again an item in the learning state that was answered with a hard
    /// grade.
    pub hard_step: Duration,
}

impl Default for IntervalAlgorithm {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            easy_bonus: 1.3,
            hard_multiplier: 1.2,
            graduating_interval: 1.0,
            easy_interval: 4.0,
            maximum_interval: 36500.0,
            again_step: Duration::minutes(1),
            hard_step: Duration::minutes(5),
        }
    }
}

impl IntervalAlgorithm {
    /// Returns the value of the given parameter in the record, or the default if it's missing.
    fn param(record: &ReviewRecord, key: &str, default: f64) -> f64 {
        record.params.get(key).copied().unwrap_or(default)
    }

    /// Returns the state, delay until the next review, interval, and ease of an item that is new
    /// or in the learning state.
    fn advance_learning(&self, grade: Grade, ease: f64) -> (ItemState, Duration, f64, f64) {
        match grade {
            Grade::Again => (ItemState::Learning, self.again_step, 0.0, ease),
            Grade::Hard => (ItemState::Learning, self.hard_step, 0.0, ease),
            Grade::Good => (
                ItemState::Review,
                Self::days(self.graduating_interval),
                self.graduating_interval,
                ease,
            ),
            Grade::Easy => (
                ItemState::Review,
                Self::days(self.easy_interval),
                self.easy_interval,
                ease,
            ),
        }
    }

    /// Returns the state, delay until the next review, interval, and ease of an item in the review
    /// state.
    fn advance_review(
        &self,
        grade: Grade,
        interval: f64,
        ease: f64,
    ) -> (ItemState, Duration, f64, f64) {
        // A lapse sends the item back to the learning steps.
        if grade == Grade::Again {
            let ease = (ease - 0.2).max(self.minimum_ease);
            return (ItemState::Learning, self.again_step, 0.0, ease);
        }

        let (multiplier, ease_delta) = match grade {
            Grade::Hard => (self.hard_multiplier, -0.15),
            Grade::Easy => (ease * self.easy_bonus, 0.15),
            _ => (ease, 0.0),
        };
        let interval = (interval * multiplier).clamp(1.0, self.maximum_interval.max(1.0));
        let ease = (ease + ease_delta).max(self.minimum_ease);
        (ItemState::Review, Self::days(interval), interval, ease)
    }

    /// Converts a fractional number of days into a duration rounded up to the next whole day.
    fn days(days: f64) -> Duration {
        Duration::try_days(days.ceil() as i64).unwrap_or(Duration::MAX)
    }
}

impl SchedulingAlgorithm for IntervalAlgorithm {
    fn advance(&self, record: &ReviewRecord, grade: Grade, now: DateTime<Utc>) -> ReviewRecord {
        let ease = Self::param(record, EASE_PARAM, self.initial_ease);
        let interval = Self::param(record, INTERVAL_PARAM, 0.0);
        let reps = Self::param(record, REPS_PARAM, 0.0);
        let lapses = Self::param(record, LAPSES_PARAM, 0.0);

        let (state, delay, interval, ease) = match record.state {
            ItemState::New | ItemState::Learning => self.advance_learning(grade, ease),
            ItemState::Review => self.advance_review(grade, interval, ease),
        };
        let lapses = if record.state == ItemState::Review && grade == Grade::Again {
            lapses + 1.0
        } else {
            lapses
        };

        // Keep any parameters written by other algorithms and overwrite the ones used here.
        let mut params = record.params.clone();
        params.insert(EASE_PARAM.to_string(), ease);
        params.insert(INTERVAL_PARAM.to_string(), interval);
        params.insert(REPS_PARAM.to_string(), reps + 1.0);
        params.insert(LAPSES_PARAM.to_string(), lapses);
        ReviewRecord {
            state,
            due: now
                .checked_add_signed(delay)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            params,
        }
    }
}

impl Item {
    /// Grades the item and replaces its record with the one computed by the algorithm.
    pub fn apply_grade(
        &mut self,
        algorithm: &dyn SchedulingAlgorithm,
        grade: Grade,
        now: DateTime<Utc>,
    ) {
        let record = algorithm.advance(&self.record, grade, now);
        info!(
            "graded item {} as {grade}: {} -> {}, due at {}",
            self.id, self.record.state, record.state, record.due
        );
        self.record = record;
    }
}
