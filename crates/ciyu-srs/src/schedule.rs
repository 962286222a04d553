use std::{fmt, str::FromStr};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{Quality, SrsError};

/// Ease factor given to a word the first time it is seen.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Floor for the ease factor; intervals always grow by at least this much.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Consecutive successes required before a word can count as mastered.
pub const MASTERED_MIN_REPETITIONS: i32 = 5;

/// Interval (in days) required before a word can count as mastered.
pub const MASTERED_MIN_INTERVAL_DAYS: i32 = 30;

/// Where a word stands in the learner's memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningState {
    /// Never answered.
    New,
    /// Failed on its very first lapse, still being acquired.
    Learning,
    /// Recalled successfully, on a growing interval.
    Review,
    /// Long interval after a run of successful recalls.
    Mastered,
    /// Forgotten again after an earlier failure.
    Lapsed,
}

impl LearningState {
    pub const ALL: [Self; 5] = [
        Self::New,
        Self::Learning,
        Self::Review,
        Self::Mastered,
        Self::Lapsed,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Review => "review",
            Self::Mastered => "mastered",
            Self::Lapsed => "lapsed",
        }
    }
}

impl fmt::Display for LearningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearningState {
    type Err = SrsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| SrsError::InvalidArgument(format!("unknown learning state '{s}'")))
    }
}

impl TryFrom<String> for LearningState {
    type Error = SrsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The mutable part of a word's review record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    /// Consecutive successful reviews.
    pub repetition_count: i32,
    pub ease_factor: f64,
    pub interval_days: i32,
    /// Failed reviews over the word's whole history.
    pub lapse_count: i32,
    pub learning_state: LearningState,
}

impl ReviewState {
    /// State of a word that has never been answered.
    pub const fn new_word() -> Self {
        Self {
            repetition_count: 0,
            ease_factor: INITIAL_EASE_FACTOR,
            interval_days: 0,
            lapse_count: 0,
            learning_state: LearningState::New,
        }
    }
}

impl Default for ReviewState {
    fn default() -> Self {
        Self::new_word()
    }
}

/// Outcome of applying one review to a [`ReviewState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledReview {
    pub state: ReviewState,
    pub due_at: DateTime<Utc>,
}

/// Apply one graded review to a word's state.
///
/// # Algorithm
///
/// A grade below 3 is a lapse: repetitions reset to 0 and the word comes back
/// the next day. The first lapse a word ever has leaves it `Learning`, later
/// ones mark it `Lapsed`. The ease factor is left alone.
///
/// A grade of 3 or more is a success. The ease factor moves by
/// `0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)` (floored at 1.3), then the interval
/// follows the SuperMemo-2 curve:
///
/// * 1st consecutive success: 1 day
/// * 2nd consecutive success: 6 days
/// * later: previous interval times the updated ease factor, rounded
///
/// A word with at least 5 consecutive successes and a 30 day interval is
/// `Mastered`, anything else that passed is `Review`.
pub fn schedule_review(
    previous: &ReviewState,
    quality: Quality,
    now: DateTime<Utc>,
) -> ScheduledReview {
    let state = if quality.is_passing() {
        let repetition_count = previous.repetition_count.saturating_add(1);
        let ease_factor = next_ease_factor(previous.ease_factor, quality);
        let interval_days = match repetition_count {
            1 => 1,
            2 => 6,
            _ => grow_interval(previous.interval_days, ease_factor),
        };
        let learning_state = if repetition_count >= MASTERED_MIN_REPETITIONS
            && interval_days >= MASTERED_MIN_INTERVAL_DAYS
        {
            LearningState::Mastered
        } else {
            LearningState::Review
        };

        ReviewState {
            repetition_count,
            ease_factor,
            interval_days,
            lapse_count: previous.lapse_count,
            learning_state,
        }
    } else {
        let learning_state = if previous.lapse_count == 0 {
            LearningState::Learning
        } else {
            LearningState::Lapsed
        };

        ReviewState {
            repetition_count: 0,
            ease_factor: previous.ease_factor.max(MIN_EASE_FACTOR),
            interval_days: 1,
            lapse_count: previous.lapse_count.saturating_add(1),
            learning_state,
        }
    };

    ScheduledReview {
        due_at: due_after(now, state.interval_days),
        state,
    }
}

fn next_ease_factor(ease_factor: f64, quality: Quality) -> f64 {
    let distance = f64::from(5 - quality.value());
    let delta = 0.1 - distance * (0.08 + distance * 0.02);
    (ease_factor + delta).max(MIN_EASE_FACTOR)
}

fn grow_interval(previous_interval_days: i32, ease_factor: f64) -> i32 {
    // Float to int casts saturate, so very long runs pin at i32::MAX.
    (f64::from(previous_interval_days) * ease_factor).round() as i32
}

fn due_after(now: DateTime<Utc>, interval_days: i32) -> DateTime<Utc> {
    TimeDelta::try_days(i64::from(interval_days))
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn q(value: u8) -> Quality {
        Quality::new(value).unwrap()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_first_success() {
        let now = fixed_now();
        let result = schedule_review(&ReviewState::new_word(), q(4), now);

        assert_eq!(result.state.repetition_count, 1);
        assert_eq!(result.state.interval_days, 1);
        assert!((result.state.ease_factor - 2.5).abs() < 1e-9);
        assert_eq!(result.state.learning_state, LearningState::Review);
        assert_eq!(result.due_at, now + Duration::days(1));
    }

    #[test]
    fn test_second_success_is_six_days() {
        let previous = ReviewState {
            repetition_count: 1,
            interval_days: 1,
            ..ReviewState::new_word()
        };
        let result = schedule_review(&previous, q(4), fixed_now());

        assert_eq!(result.state.repetition_count, 2);
        assert_eq!(result.state.interval_days, 6);
    }

    #[test]
    fn test_third_success_uses_updated_ease() {
        let now = fixed_now();
        let previous = ReviewState {
            repetition_count: 2,
            ease_factor: 2.5,
            interval_days: 6,
            lapse_count: 0,
            learning_state: LearningState::Review,
        };
        let result = schedule_review(&previous, q(5), now);

        assert_eq!(result.state.repetition_count, 3);
        assert!((result.state.ease_factor - 2.6).abs() < 1e-9);
        // 6 * 2.6 = 15.6
        assert_eq!(result.state.interval_days, 16);
        assert_eq!(result.due_at, now + Duration::days(16));
    }

    #[test]
    fn test_quality_three_lowers_ease() {
        let result = schedule_review(&ReviewState::new_word(), q(3), fixed_now());
        // 0.1 - 2 * (0.08 + 2 * 0.02) = -0.14
        assert!((result.state.ease_factor - 2.36).abs() < 1e-9);
        assert_eq!(result.state.learning_state, LearningState::Review);
    }

    #[test]
    fn test_first_failure_is_learning() {
        let result = schedule_review(&ReviewState::new_word(), q(0), fixed_now());

        assert_eq!(result.state.repetition_count, 0);
        assert_eq!(result.state.interval_days, 1);
        assert_eq!(result.state.lapse_count, 1);
        assert_eq!(result.state.learning_state, LearningState::Learning);
    }

    #[test]
    fn test_later_failure_is_lapsed() {
        let previous = ReviewState {
            repetition_count: 4,
            ease_factor: 2.7,
            interval_days: 40,
            lapse_count: 1,
            learning_state: LearningState::Review,
        };
        let result = schedule_review(&previous, q(2), fixed_now());

        assert_eq!(result.state.repetition_count, 0);
        assert_eq!(result.state.interval_days, 1);
        assert_eq!(result.state.lapse_count, 2);
        assert_eq!(result.state.learning_state, LearningState::Lapsed);
        assert!((result.state.ease_factor - 2.7).abs() < 1e-9);
    }

    #[test]
    fn test_mastered_after_long_run() {
        let mut state = ReviewState::new_word();
        let mut states = Vec::new();
        for _ in 0..5 {
            state = schedule_review(&state, q(5), fixed_now()).state;
            states.push(state.learning_state);
        }

        // Ease climbs by 0.1 per perfect answer: intervals 1, 6, 17, 49, 147
        assert_eq!(state.interval_days, 147);
        assert_eq!(state.learning_state, LearningState::Mastered);
        assert!(
            states[..4]
                .iter()
                .all(|s| *s == LearningState::Review)
        );
    }

    #[test]
    fn test_five_repetitions_with_short_interval_is_not_mastered() {
        let previous = ReviewState {
            repetition_count: 4,
            ease_factor: MIN_EASE_FACTOR,
            interval_days: 10,
            lapse_count: 2,
            learning_state: LearningState::Review,
        };
        let result = schedule_review(&previous, q(3), fixed_now());

        assert_eq!(result.state.repetition_count, 5);
        assert_eq!(result.state.interval_days, 13);
        assert_eq!(result.state.learning_state, LearningState::Review);
    }

    #[test]
    fn test_learning_state_round_trip_names() {
        for state in LearningState::ALL {
            assert_eq!(state.as_str().parse::<LearningState>().unwrap(), state);
        }
        assert!("forgotten".parse::<LearningState>().is_err());
    }

    #[test]
    fn test_huge_interval_does_not_overflow() {
        let previous = ReviewState {
            repetition_count: 30,
            ease_factor: 4.0,
            interval_days: i32::MAX,
            lapse_count: 0,
            learning_state: LearningState::Mastered,
        };
        let result = schedule_review(&previous, q(5), fixed_now());
        assert_eq!(result.state.interval_days, i32::MAX);
        assert_eq!(result.due_at, DateTime::<Utc>::MAX_UTC);
    }

    proptest! {
        #[test]
        fn prop_failure_always_resets(
            repetition_count in 0i32..50,
            ease_factor in 1.3f64..5.0,
            interval_days in 0i32..5_000,
            lapse_count in 0i32..20,
            quality in 0u8..3,
        ) {
            let previous = ReviewState {
                repetition_count,
                ease_factor,
                interval_days,
                lapse_count,
                learning_state: LearningState::Review,
            };
            let result = schedule_review(&previous, q(quality), fixed_now());
            prop_assert_eq!(result.state.repetition_count, 0);
            prop_assert_eq!(result.state.interval_days, 1);
        }

        #[test]
        fn prop_ease_never_below_floor(qualities in proptest::collection::vec(0u8..=5, 1..60)) {
            let mut state = ReviewState::new_word();
            for quality in qualities {
                state = schedule_review(&state, q(quality), fixed_now()).state;
                prop_assert!(state.ease_factor >= MIN_EASE_FACTOR);
            }
        }

        #[test]
        fn prop_perfect_recall_grows_strictly(start_ease in 1.3f64..3.0) {
            let mut state = ReviewState { ease_factor: start_ease, ..ReviewState::new_word() };
            let mut intervals = Vec::new();
            for _ in 0..10 {
                state = schedule_review(&state, q(5), fixed_now()).state;
                intervals.push(state.interval_days);
            }
            for pair in intervals[1..].windows(2) {
                prop_assert!(pair[1] > pair[0], "intervals {:?}", intervals);
            }
        }
    }
}
