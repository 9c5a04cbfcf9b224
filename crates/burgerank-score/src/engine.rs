//! Score calculator: statistics in, [`RankingScore`] out.
//!
//! ```text
//! base      = (1 - wilson_blend) * bayes + wilson_blend * (wilson * 5)
//! composite = base * verification * novelty * variance * recency
//! ```
//!
//! The composite is clamped to `[0, score_ceiling]` and rounded to four
//! decimals. Computation never fails: a factor whose input is missing falls
//! back to `1.0` and is listed in [`RankingScore::degraded`].

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use burgerank_core::config::ScoreConfig;
use burgerank_core::constants::{MAX_RATING, SCORE_DECIMALS};
use burgerank_core::traits::StatisticsSource;
use burgerank_core::types::ScoreFactors;
use burgerank_core::{DegradedFactor, ItemId, ItemStatistics, RankingConfig, RankingScore, StoreError};

use crate::estimators::{bayesian_mean, wilson_lower_bound};
use crate::factors::{novelty_boost, recency_factor, variance_penalty, verification_factor};

/// Computes composite scores under one [`ScoreConfig`].
#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    config: ScoreConfig,
}

impl ScoreCalculator {
    pub fn new(config: ScoreConfig) -> Self {
        Self { config }
    }

    pub fn from_ranking_config(config: &RankingConfig) -> Self {
        Self::new(config.score.clone())
    }

    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    /// Score one item. The returned score has no rank position yet; see
    /// [`crate::ordering::assign_ranks`].
    pub fn compute(&self, stats: &ItemStatistics, now: DateTime<Utc>) -> RankingScore {
        let cfg = &self.config;
        let mut degraded = Vec::new();

        let bayes = bayesian_mean(
            cfg.prior_mean,
            cfg.prior_weight,
            stats.total_rating_count,
            stats.mean_rating,
        );
        let wilson = wilson_lower_bound(stats.positive_rating_count, stats.total_rating_count);
        if stats.total_rating_count == 0 {
            degraded.push(DegradedFactor::BayesianMean);
            degraded.push(DegradedFactor::Wilson);
        }

        let verification =
            verification_factor(stats.verified_rating_count, stats.total_rating_count);
        let novelty = novelty_boost(stats.created_at, now, cfg.novelty_window_days);
        let variance = variance_penalty(stats.std_deviation);
        let recency = recency_factor(stats.recent_rating_count, stats.total_rating_count);
        degraded.extend(
            [verification, novelty, variance, recency]
                .iter()
                .filter_map(|f| f.degraded),
        );

        let factors = ScoreFactors {
            verification: verification.value,
            novelty: novelty.value,
            variance: variance.value,
            recency: recency.value,
        };

        let base = (1.0 - cfg.wilson_blend) * bayes + cfg.wilson_blend * wilson * MAX_RATING;
        let raw = base * factors.product();
        let composite = if raw.is_finite() {
            round_to(raw.clamp(0.0, cfg.score_ceiling), SCORE_DECIMALS)
        } else {
            warn!(item = %stats.item_id, raw, "score: non-finite composite, clamped to zero");
            0.0
        };

        if !degraded.is_empty() {
            debug!(item = %stats.item_id, ?degraded, "score: factors fell back to neutral");
        }

        RankingScore {
            item_id: stats.item_id.clone(),
            composite_score: composite,
            bayesian_score: round_to(bayes, SCORE_DECIMALS),
            wilson_score: round_to(wilson, SCORE_DECIMALS),
            factors,
            rank_position: None,
            eligible: stats.total_rating_count >= cfg.min_for_ranking,
            total_rating_count: stats.total_rating_count,
            created_at: stats.created_at,
            degraded,
        }
    }

    /// Fetch statistics from `source` and score them. `Ok(None)` when the
    /// source does not know the item.
    pub fn score_item(
        &self,
        source: &dyn StatisticsSource,
        item: &ItemId,
        now: DateTime<Utc>,
    ) -> Result<Option<RankingScore>, StoreError> {
        Ok(source.statistics(item, now)?.map(|stats| self.compute(&stats, now)))
    }
}

/// Functional form of [`ScoreCalculator::compute`].
pub fn compute_score(
    stats: &ItemStatistics,
    config: &RankingConfig,
    now: DateTime<Utc>,
) -> RankingScore {
    ScoreCalculator::from_ranking_config(config).compute(stats, now)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
