use serde::{Deserialize, Serialize};

use crate::SrsError;

/// Highest grade a review can receive.
pub const MAX_QUALITY: u8 = 5;

/// Grades below this value count as a lapse.
pub const PASSING_QUALITY: u8 = 3;

/// A recall grade in `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    /// Build a grade, rejecting anything above 5.
    pub fn new(value: u8) -> Result<Self, SrsError> {
        if value > MAX_QUALITY {
            return Err(SrsError::InvalidArgument(format!(
                "quality must be between 0 and {MAX_QUALITY}, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether the grade advances the schedule rather than resetting it.
    pub const fn is_passing(self) -> bool {
        self.0 >= PASSING_QUALITY
    }
}

impl TryFrom<u8> for Quality {
    type Error = SrsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Map an answer outcome to a recall grade.
///
/// Wrong answers always grade 0, whatever the latency. Correct answers grade by
/// response time:
///
/// * `< 2s`: 5
/// * `< 5s`: 4
/// * `< 10s`: 3
/// * otherwise: 2
///
/// # Errors
///
/// Returns [`SrsError::InvalidArgument`] for a negative `response_time_ms`.
pub fn calculate_quality(is_correct: bool, response_time_ms: i64) -> Result<Quality, SrsError> {
    if response_time_ms < 0 {
        return Err(SrsError::InvalidArgument(format!(
            "response time cannot be negative, got {response_time_ms}ms"
        )));
    }

    if !is_correct {
        return Ok(Quality(0));
    }

    let grade = match response_time_ms {
        t if t < 2_000 => 5,
        t if t < 5_000 => 4,
        t if t < 10_000 => 3,
        _ => 2,
    };

    Ok(Quality(grade))
}
