//! SM-2 style review scheduling
//!
//! Grading mutates a single [`VocabularyItem`] in place:
//!
//! - **Success** (quality ≥ 3): the interval grows `0 → 1 → 6 → round(interval × ease)`,
//!   the ease factor moves by `0.1 − (5−q)(0.08 + (5−q)·0.02)` with a floor of 1.3,
//!   and the status advances to `learning`, `review` or `learned`.
//! - **Failure** (quality < 3): the interval resets to 0, the ease factor is kept,
//!   and the status drops back to `learning` whatever it was before.
//!
//! Both outcomes bump `review_count` and stamp `last_reviewed_at`.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::error::ReviewError;
use crate::models::{VocabularyItem, VocabularyStatus};

/// Ease factor given to newly saved words
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Lower bound the ease factor never drops below
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Lowest grade that counts as a successful recall
pub const PASSING_QUALITY: u8 = 3;

/// Reviews needed (with a grade of 4 or better) before a word counts as learned
pub const LEARNED_AFTER_REVIEWS: u32 = 5;

/// A recall grade in `0..=5`
///
/// Constructed through `TryFrom`, which rejects anything outside that range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 5;

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_passing(self) -> bool {
        self.0 >= PASSING_QUALITY
    }
}

impl TryFrom<i64> for Quality {
    type Error = ReviewError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(grade) if grade <= Self::MAX => Ok(Quality(grade)),
            _ => Err(ReviewError::InvalidQuality(value)),
        }
    }
}

impl TryFrom<u8> for Quality {
    type Error = ReviewError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Quality::try_from(i64::from(value))
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ease factor after a successful review graded `quality`
pub fn next_ease_factor(ease_factor: f64, quality: Quality) -> f64 {
    let miss = f64::from(Quality::MAX - quality.value());
    (ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR)
}

/// Longest interval, in days, a review can be pushed out to (about a century)
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Interval after a successful review, capped at [`MAX_INTERVAL_DAYS`]
pub fn next_interval(interval: u32, ease_factor: f64) -> u32 {
    match interval {
        0 => 1,
        1 => 6,
        days => (f64::from(days) * ease_factor).round().min(f64::from(MAX_INTERVAL_DAYS)) as u32,
    }
}

/// Apply one review to `item`
///
/// # Arguments
///
/// * `item` - The word being reviewed, updated in place
/// * `quality` - Recall grade; 3 and above counts as a success
/// * `now` - Review timestamp, stored as `last_reviewed_at`
///
/// # Example
///
/// ```ignore
/// let quality = Quality::try_from(4u8)?;
/// grade_review(&mut item, quality, Utc::now());
/// assert_eq!(item.interval, 1);
/// ```
pub fn grade_review(item: &mut VocabularyItem, quality: Quality, now: DateTime<Utc>) {
    let before = (item.interval, item.ease_factor, item.status);

    item.review_count = item.review_count.saturating_add(1);
    item.last_reviewed_at = Some(now);

    if quality.is_passing() {
        item.interval = next_interval(item.interval, item.ease_factor);
        item.ease_factor = next_ease_factor(item.ease_factor, quality);
        item.status = if item.review_count >= LEARNED_AFTER_REVIEWS && quality.value() >= 4 {
            VocabularyStatus::Learned
        } else if item.review_count >= 2 {
            VocabularyStatus::Review
        } else {
            VocabularyStatus::Learning
        };
    } else {
        item.interval = 0;
        item.status = VocabularyStatus::Learning;
    }

    debug!(
        id = %item.id,
        quality = quality.value(),
        interval = %format!("{} -> {}", before.0, item.interval),
        ease = %format!("{:.2} -> {:.2}", before.1, item.ease_factor),
        status = %format!("{} -> {}", before.2, item.status),
        "Graded review"
    );
}

/// When the item is next due; `None` if it was never reviewed
///
/// A date past chrono's range saturates to [`DateTime::<Utc>::MAX_UTC`].
pub fn next_review_at(item: &VocabularyItem) -> Option<DateTime<Utc>> {
    item.last_reviewed_at.map(|reviewed| {
        reviewed
            .checked_add_signed(Duration::days(i64::from(item.interval)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    })
}

pub fn is_due(item: &VocabularyItem, now: DateTime<Utc>) -> bool {
    if item.status == VocabularyStatus::Learned {
        return false;
    }
    next_review_at(item).is_none_or(|due| due <= now)
}

/// Bounded review queue: `new` before `learning` before `review`, oldest first within a group
pub fn due_queue<'a, I>(items: I, limit: usize, now: DateTime<Utc>) -> Vec<VocabularyItem>
where
    I: IntoIterator<Item = &'a VocabularyItem>,
{
    let mut due: Vec<&VocabularyItem> = items.into_iter().filter(|item| is_due(item, now)).collect();
    due.sort_by_key(|item| (item.status.queue_priority(), item.recency_anchor()));
    due.into_iter().take(limit).cloned().collect()
}
