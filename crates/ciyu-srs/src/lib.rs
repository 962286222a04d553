//! SRS (Spaced Repetition System) library for Ciyu
//!
//! This crate provides the pure scheduling arithmetic behind vocabulary practice:
//! grading an answer, advancing a word's review state with a SuperMemo-2 style
//! curve, and composing a session queue from due reviews and unseen words.
//!
//! Nothing in here touches storage or the clock; callers pass `now` explicitly.

pub mod error;
pub mod quality;
pub mod queue;
pub mod schedule;

pub use error::SrsError;
pub use quality::{Quality, calculate_quality};
pub use queue::{DueWord, QueueItem, compose_queue, fisher_yates_shuffle, shuffle_pool};
pub use schedule::{
    INITIAL_EASE_FACTOR, LearningState, MIN_EASE_FACTOR, ReviewState, ScheduledReview,
    schedule_review,
};
