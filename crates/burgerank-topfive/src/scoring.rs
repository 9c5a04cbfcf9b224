//! Automatic top-five derivation from a user's own reviews.
//!
//! Each review contributes `(stars * 0.6 + likes * 0.1) * decay`, where
//! `decay = max(floor, 1 - age_days / decay_days)`. Contributions are summed
//! per item and the five highest items win.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;

use burgerank_core::config::TopFiveConfig;
use burgerank_core::constants::{TOP_FIVE_LIKES_WEIGHT, TOP_FIVE_RATING_WEIGHT, TOP_FIVE_SIZE};
use burgerank_core::{ItemId, RatingRecord};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Weight of one review at `now`.
pub fn review_weight(review: &RatingRecord, now: DateTime<Utc>, config: &TopFiveConfig) -> f64 {
    let age_days = ((now - review.created_at).num_seconds() as f64 / SECONDS_PER_DAY).max(0.0);
    let decay = (1.0 - age_days / config.review_decay_days).max(config.review_weight_floor);
    (review.score * TOP_FIVE_RATING_WEIGHT + f64::from(review.likes) * TOP_FIVE_LIKES_WEIGHT) * decay
}

/// Up to five distinct items from `reviews`, best first. Ties go to the
/// smaller item id.
pub fn auto_top_five(reviews: &[RatingRecord], now: DateTime<Utc>, config: &TopFiveConfig) -> Vec<ItemId> {
    let mut totals: HashMap<&ItemId, f64> = HashMap::new();
    for review in reviews {
        *totals.entry(&review.item_id).or_insert(0.0) += review_weight(review, now, config);
    }

    let mut ranked: Vec<(&ItemId, f64)> = totals.into_iter().collect();
    ranked.sort_by(|(a_id, a), (b_id, b)| {
        OrderedFloat(*b).cmp(&OrderedFloat(*a)).then_with(|| a_id.cmp(b_id))
    });
    ranked.into_iter().take(TOP_FIVE_SIZE).map(|(id, _)| id.clone()).collect()
}
