//! Rank ordering of scored items.
//!
//! Eligible items are ordered by composite score descending, then by total
//! rating count descending, then by creation time ascending (older first).
//! Item id is the final tie-break so the order is total and reproducible.

use std::cmp::Ordering;

use ordered_float::OrderedFloat;

use burgerank_core::RankingScore;

/// Rank order between two scores, ignoring eligibility.
pub fn rank_order(a: &RankingScore, b: &RankingScore) -> Ordering {
    OrderedFloat(b.composite_score)
        .cmp(&OrderedFloat(a.composite_score))
        .then_with(|| b.total_rating_count.cmp(&a.total_rating_count))
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.item_id.cmp(&b.item_id))
}

/// Sort `scores` into rank order and assign 1-based positions.
///
/// Eligible items come first and receive positions `1..=n`; ineligible items
/// follow in the same order with `rank_position = None`.
pub fn assign_ranks(scores: &mut [RankingScore]) {
    scores.sort_by(|a, b| b.eligible.cmp(&a.eligible).then_with(|| rank_order(a, b)));

    let mut position = 0u32;
    for score in scores.iter_mut() {
        if score.eligible {
            position += 1;
            score.rank_position = Some(position);
        } else {
            score.rank_position = None;
        }
    }
}

/// The top `n` eligible items in rank order.
///
/// Works on unsorted input; positions already assigned are not trusted.
pub fn leaderboard(scores: &[RankingScore], n: usize) -> Vec<RankingScore> {
    let mut eligible: Vec<RankingScore> = scores.iter().filter(|s| s.eligible).cloned().collect();
    eligible.sort_by(rank_order);
    eligible.truncate(n);
    for (i, score) in eligible.iter_mut().enumerate() {
        score.rank_position = Some(i as u32 + 1);
    }
    eligible
}
