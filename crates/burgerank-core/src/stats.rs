//! Derivation of [`ItemStatistics`] from raw rating history.
//!
//! Suspicious ratings never contribute to any aggregate.

use chrono::{DateTime, Duration, Utc};

use crate::types::{ItemId, ItemStatistics, RatingRecord};

impl ItemStatistics {
    /// Aggregate an item's rating history.
    ///
    /// `recent_window_days` defines which ratings count toward
    /// `recent_rating_count`. Ratings belonging to other items are ignored.
    pub fn from_ratings(
        item_id: ItemId,
        created_at: DateTime<Utc>,
        ratings: &[RatingRecord],
        now: DateTime<Utc>,
        recent_window_days: i64,
    ) -> Self {
        let counted: Vec<&RatingRecord> = ratings
            .iter()
            .filter(|r| r.item_id == item_id && !r.suspicious)
            .collect();

        if counted.is_empty() {
            return Self::empty(item_id, created_at);
        }

        let recent_cutoff = window_start(now, recent_window_days);
        let n = counted.len() as f64;
        let mean = counted.iter().map(|r| r.score).sum::<f64>() / n;
        let variance = counted.iter().map(|r| (r.score - mean).powi(2)).sum::<f64>() / n;

        Self {
            item_id,
            total_rating_count: counted.len() as u64,
            verified_rating_count: counted.iter().filter(|r| r.verified).count() as u64,
            positive_rating_count: counted.iter().filter(|r| r.is_positive()).count() as u64,
            recent_rating_count: Some(
                counted.iter().filter(|r| r.created_at > recent_cutoff).count() as u64,
            ),
            mean_rating: mean,
            std_deviation: Some(variance.sqrt()),
            created_at,
            last_rating_at: counted.iter().map(|r| r.created_at).max(),
        }
    }
}

/// Start of a window reaching `days` back from `now`. A window longer than
/// chrono can represent starts at the earliest representable instant.
pub fn window_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
