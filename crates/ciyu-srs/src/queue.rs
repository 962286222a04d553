//! Session queue composition ("mixed vocabulary").
//!
//! The composition of a queue is deterministic (which words get in), only the
//! presentation order is random.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::Rng;

/// Anything that can be scheduled by word id.
pub trait QueueItem {
    fn word_id(&self) -> &str;
}

/// A reviewed word that is due, as reported by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueWord {
    pub word_id: String,
    pub due_at: DateTime<Utc>,
}

/// Compose the practice queue for one session.
///
/// 1. Drop duplicate ids from `pool`, keeping the first occurrence.
/// 2. Take due words that are in the pool, most overdue first (ties by id).
/// 3. Fill with pool words that were never reviewed, in pool order.
/// 4. Fill with whatever is left of the pool (reviewed but not yet due).
/// 5. Shuffle the result.
///
/// `reviewed` holds every word id that has a review record, due or not. The
/// result never repeats an id and holds `min(count, unique pool size)` items.
pub fn compose_queue<T, R>(
    pool: Vec<T>,
    due: &[DueWord],
    reviewed: &HashSet<String>,
    count: usize,
    rng: &mut R,
) -> Vec<T>
where
    T: QueueItem,
    R: Rng + ?Sized,
{
    let mut remaining = dedup_by_word_id(pool);

    let mut due_in_pool: Vec<&DueWord> = due
        .iter()
        .filter(|d| remaining.iter().any(|item| item.word_id() == d.word_id))
        .collect();
    due_in_pool.sort_by(|a, b| {
        a.due_at
            .cmp(&b.due_at)
            .then_with(|| a.word_id.cmp(&b.word_id))
    });

    let mut queue = Vec::with_capacity(count.min(remaining.len()));

    for due_word in due_in_pool {
        if queue.len() >= count {
            break;
        }
        if let Some(pos) = remaining
            .iter()
            .position(|item| item.word_id() == due_word.word_id)
        {
            queue.push(remaining.remove(pos));
        }
    }

    let mut not_due = Vec::new();
    for item in remaining {
        if queue.len() < count && !reviewed.contains(item.word_id()) {
            queue.push(item);
        } else {
            not_due.push(item);
        }
    }

    let open_slots = count.saturating_sub(queue.len());
    queue.extend(not_due.into_iter().take(open_slots));

    fisher_yates_shuffle(&mut queue, rng);
    queue
}

/// Fallback composition when review history is unavailable: every pool word is
/// treated as new, then shuffled and cut to `count`.
pub fn shuffle_pool<T, R>(pool: Vec<T>, count: usize, rng: &mut R) -> Vec<T>
where
    T: QueueItem,
    R: Rng + ?Sized,
{
    let mut queue = dedup_by_word_id(pool);
    fisher_yates_shuffle(&mut queue, rng);
    queue.truncate(count);
    queue
}

/// Uniform in-place permutation.
pub fn fisher_yates_shuffle<T, R>(items: &mut [T], rng: &mut R)
where
    R: Rng + ?Sized,
{
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

fn dedup_by_word_id<T: QueueItem>(pool: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    pool.into_iter()
        .filter(|item| seen.insert(item.word_id().to_owned()))
        .collect()
}
