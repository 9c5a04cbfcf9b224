//! Batch re-scoring of every known item.

use chrono::{DateTime, Utc};
use tracing::info;

use burgerank_core::traits::RankingStore;
use burgerank_core::{RankingScore, StoreError};
use burgerank_score::{ScoreCalculator, assign_ranks};

/// Score every item in one statistics snapshot, assign rank positions and
/// store the results. Returns the scores in rank order, eligible items
/// first.
pub fn recompute_rankings<S: RankingStore + ?Sized>(
    store: &S,
    calculator: &ScoreCalculator,
    now: DateTime<Utc>,
) -> Result<Vec<RankingScore>, StoreError> {
    let snapshot = store.statistics_snapshot(now)?;
    let mut scores: Vec<RankingScore> = snapshot.iter().map(|stats| calculator.compute(stats, now)).collect();
    assign_ranks(&mut scores);

    for score in &scores {
        store.store_score(score)?;
    }
    let ranked = scores.iter().filter(|s| s.rank_position.is_some()).count();
    info!(items = scores.len(), ranked, "recompute: rankings refreshed");
    Ok(scores)
}
