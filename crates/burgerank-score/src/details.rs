//! Per-item score breakdown for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use burgerank_core::types::ScoreFactors;
use burgerank_core::{
    DegradedFactor, ItemId, ItemStatistics, RankingScore, RatingRecord, window_start,
};

/// Counted ratings in five star buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingDistribution {
    /// Exactly 5 stars.
    pub five: u64,
    /// `[4, 5)`
    pub four: u64,
    /// `[3, 4)`
    pub three: u64,
    /// `[2, 3)`
    pub two: u64,
    /// Below 2.
    pub one: u64,
}

impl RatingDistribution {
    fn add(&mut self, score: f64) {
        match score {
            s if s >= 5.0 => self.five += 1,
            s if s >= 4.0 => self.four += 1,
            s if s >= 3.0 => self.three += 1,
            s if s >= 2.0 => self.two += 1,
            _ => self.one += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.five + self.four + self.three + self.two + self.one
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingDetails {
    pub item_id: ItemId,
    pub rank_position: Option<u32>,
    pub composite_score: f64,
    pub eligible: bool,
    pub bayesian_score: f64,
    pub wilson_score: f64,
    pub mean_rating: f64,
    pub factors: ScoreFactors,
    /// Rounded to a whole percent.
    pub verified_percentage: u32,
    pub distribution: RatingDistribution,
    pub photo_count: u64,
    pub receipt_count: u64,
    pub recent_count: u64,
    pub degraded: Vec<DegradedFactor>,
}

impl RankingDetails {
    /// Assemble the breakdown from a computed score, the statistics it was
    /// computed from, and the item's rating history. Suspicious ratings and
    /// ratings of other items are skipped.
    pub fn build(
        score: &RankingScore,
        stats: &ItemStatistics,
        ratings: &[RatingRecord],
        now: DateTime<Utc>,
        recent_window_days: i64,
    ) -> Self {
        let cutoff = window_start(now, recent_window_days);
        let mut distribution = RatingDistribution::default();
        let (mut photo_count, mut receipt_count, mut recent_count) = (0, 0, 0);

        for r in ratings.iter().filter(|r| r.item_id == score.item_id && !r.suspicious) {
            distribution.add(r.score);
            photo_count += u64::from(r.has_photo);
            receipt_count += u64::from(r.has_receipt);
            recent_count += u64::from(r.created_at > cutoff);
        }

        let verified_percentage = if stats.total_rating_count == 0 {
            0
        } else {
            (stats.verified_rating_count.min(stats.total_rating_count) as f64 * 100.0
                / stats.total_rating_count as f64)
                .round() as u32
        };

        Self {
            item_id: score.item_id.clone(),
            rank_position: if score.eligible { score.rank_position } else { None },
            composite_score: score.composite_score,
            eligible: score.eligible,
            bayesian_score: score.bayesian_score,
            wilson_score: score.wilson_score,
            mean_rating: stats.mean_rating,
            factors: score.factors,
            verified_percentage,
            distribution,
            photo_count,
            receipt_count,
            recent_count,
            degraded: score.degraded.clone(),
        }
    }
}
