use ciyu_db::models::Language;
use validator::ValidateLength;

use crate::error::ApiError;

const MAX_LEVEL_LEN: u64 = 32;
const MAX_WORD_ID_LEN: u64 = 128;
const MAX_EXERCISE_TYPE_LEN: u64 = 64;

/// Parse a language path segment or field
pub fn parse_language(value: &str) -> Result<Language, ApiError> {
    value
        .parse()
        .map_err(|e: ciyu_db::models::UnknownLanguage| ApiError::InvalidArgument(e.to_string()))
}

/// Validate a level tier such as `hsk3` or `so-cap`
///
/// # Examples
/// ```
/// use ciyu_api::validation::validate_level;
///
/// assert!(validate_level("hsk3").is_ok());
/// assert!(validate_level("hsk 3").is_err());
/// ```
pub fn validate_level(level: &str) -> Result<(), ApiError> {
    if !level.validate_length(Some(1), Some(MAX_LEVEL_LEN), None) {
        return Err(ApiError::InvalidArgument(format!(
            "Level must be between 1 and {MAX_LEVEL_LEN} characters"
        )));
    }

    if !level
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ApiError::InvalidArgument(format!(
            "Invalid level: '{level}'. Only letters, digits, '-' and '_' are allowed"
        )));
    }

    Ok(())
}

/// Validate a vocabulary word id
pub fn validate_word_id(word_id: &str) -> Result<(), ApiError> {
    if word_id.trim().is_empty() {
        return Err(ApiError::InvalidArgument(
            "Word id cannot be empty".to_string(),
        ));
    }

    if !word_id.validate_length(None, Some(MAX_WORD_ID_LEN), None) {
        return Err(ApiError::InvalidArgument(format!(
            "Word id must be at most {MAX_WORD_ID_LEN} characters"
        )));
    }

    Ok(())
}

/// Validate a quiz kind such as `pinyin_choice`
pub fn validate_exercise_type(exercise_type: &str) -> Result<(), ApiError> {
    if !exercise_type.validate_length(Some(1), Some(MAX_EXERCISE_TYPE_LEN), None) {
        return Err(ApiError::InvalidArgument(format!(
            "Exercise type must be between 1 and {MAX_EXERCISE_TYPE_LEN} characters"
        )));
    }

    if !exercise_type
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(ApiError::InvalidArgument(format!(
            "Invalid exercise type: '{exercise_type}'. Use snake_case"
        )));
    }

    Ok(())
}

/// Resolve the requested queue length against the configured bounds.
///
/// `None` falls back to `default`. Anything below 1 or above `max` is rejected.
pub fn validate_queue_count(
    count: Option<i64>,
    default: usize,
    max: usize,
) -> Result<usize, ApiError> {
    let Some(count) = count else {
        return Ok(default);
    };

    if count < 1 {
        return Err(ApiError::InvalidArgument(format!(
            "Count must be at least 1, got {count}"
        )));
    }

    match usize::try_from(count) {
        Ok(count) if count <= max => Ok(count),
        _ => Err(ApiError::InvalidArgument(format!(
            "Count must be at most {max}, got {count}"
        ))),
    }
}

/// Convert a client-measured latency to whole milliseconds.
///
/// Quiz pages time answers with sub-millisecond clocks, so fractions are
/// rounded. Negative or non-finite values are rejected.
pub fn parse_response_time_ms(value: f64) -> Result<i64, ApiError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ApiError::InvalidArgument(format!(
            "Response time must be a non-negative number of milliseconds, got {value}"
        )));
    }

    // Saturates for absurdly large values.
    Ok(value.round() as i64)
}
