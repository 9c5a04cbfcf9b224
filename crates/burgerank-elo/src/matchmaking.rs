//! Choosing the next head-to-head comparison for a user.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use burgerank_core::constants::{MATCH_PAIR_ATTEMPTS, RECENT_MATCH_MEMORY};
use burgerank_core::types::pair_key;
use burgerank_core::{ItemId, MatchRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub item_a: ItemId,
    pub item_b: ItemId,
}

/// Draw two distinct items from `rated_items`.
///
/// Pairs played in the newest [`RECENT_MATCH_MEMORY`] entries of
/// `recent_matches` (newest first, either order) are avoided for up to
/// [`MATCH_PAIR_ATTEMPTS`] draws; after that the last draw is returned
/// anyway. `None` when fewer than two distinct items are available.
pub fn pick_match_pair<R: Rng>(
    rated_items: &[ItemId],
    recent_matches: &[MatchRecord],
    rng: &mut R,
) -> Option<MatchPair> {
    let mut seen = HashSet::new();
    let items: Vec<&ItemId> = rated_items.iter().filter(|id| seen.insert(*id)).collect();
    if items.len() < 2 {
        return None;
    }

    let recent: HashSet<(ItemId, ItemId)> = recent_matches
        .iter()
        .take(RECENT_MATCH_MEMORY)
        .map(MatchRecord::pair_key)
        .collect();

    let mut last = None;
    for attempt in 0..MATCH_PAIR_ATTEMPTS {
        let a = rng.gen_range(0..items.len());
        let mut b = rng.gen_range(0..items.len() - 1);
        if b >= a {
            b += 1;
        }
        let pair = MatchPair { item_a: items[a].clone(), item_b: items[b].clone() };
        if !recent.contains(&pair_key(&pair.item_a, &pair.item_b)) {
            return Some(pair);
        }
        debug!(attempt, a = %pair.item_a, b = %pair.item_b, "matchmaking: pair seen recently, redrawing");
        last = Some(pair);
    }
    last
}
