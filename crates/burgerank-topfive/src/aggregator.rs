//! Per-user top-five shortlist service.
//!
//! Read path for a user:
//! 1. A pinned manual list, if any, is returned as-is.
//! 2. A fresh cached auto list is returned as-is.
//! 3. Otherwise the list is recomputed from the user's reviews, cached with
//!    `computed_at = now`, and returned. If the history read fails and a
//!    stale entry exists, the stale entry is served.
//!
//! [`TopFiveAggregator::invalidate`] drops the pin and resets the cache
//! timestamp to the epoch, so the next read recomputes.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use burgerank_core::config::TopFiveConfig;
use burgerank_core::constants::TOP_FIVE_SIZE;
use burgerank_core::traits::RatingHistory;
use burgerank_core::{ItemId, StoreError, TopFiveError, UserId, UserTopFive};

use crate::cache::{CacheLookup, TtlCache};
use crate::scoring::auto_top_five;

pub struct TopFiveAggregator<H: ?Sized> {
    history: Arc<H>,
    config: TopFiveConfig,
    cache: TtlCache<UserId, UserTopFive>,
    pinned: RwLock<HashMap<UserId, UserTopFive>>,
}

impl<H: RatingHistory + ?Sized> TopFiveAggregator<H> {
    pub fn new(history: Arc<H>, config: TopFiveConfig) -> Self {
        let cache = TtlCache::new(config.cache_ttl());
        Self { history, config, cache, pinned: RwLock::new(HashMap::new()) }
    }

    /// The user's current shortlist. Never errors for a user without
    /// reviews: the list is simply empty.
    pub fn get_top_five(&self, user: &UserId, now: DateTime<Utc>) -> Result<UserTopFive, StoreError> {
        if let Some(pinned) = self.pinned.read().get(user) {
            return Ok(pinned.clone());
        }

        let cached = match self.cache.get(user, now) {
            CacheLookup::Fresh(entry) => {
                debug!(%user, "topfive: cache hit");
                return Ok(entry);
            }
            expired => expired,
        };

        match self.history.ratings_by_user(user) {
            Ok(reviews) => {
                let entry = UserTopFive {
                    user_id: user.clone(),
                    items: auto_top_five(&reviews, now, &self.config),
                    is_manual: false,
                    computed_at: now,
                };
                debug!(%user, reviews = reviews.len(), items = entry.items.len(), "topfive: recomputed");
                self.cache.put(user.clone(), entry.clone(), now);
                Ok(entry)
            }
            Err(e) => match cached.into_value() {
                Some(entry) => {
                    warn!(%user, error = %e, "topfive: history unavailable, serving stale list");
                    Ok(entry)
                }
                None => Err(e),
            },
        }
    }

    /// Pin an ordered list of exactly five distinct items.
    pub fn set_manual_top_five(
        &self,
        user: &UserId,
        items: Vec<ItemId>,
        now: DateTime<Utc>,
    ) -> Result<UserTopFive, TopFiveError> {
        validate_manual(&items)?;
        let entry = UserTopFive { user_id: user.clone(), items, is_manual: true, computed_at: now };
        self.pinned.write().insert(user.clone(), entry.clone());
        info!(%user, "topfive: manual list pinned");
        Ok(entry)
    }

    /// Force recomputation on the next read. Called whenever the user
    /// submits, edits or deletes a rating.
    pub fn invalidate(&self, user: &UserId) {
        let unpinned = self.pinned.write().remove(user).is_some();
        let cached = self.cache.invalidate(user);
        debug!(%user, unpinned, cached, "topfive: invalidated");
    }

    /// Drop the manual pin only. Returns whether one existed.
    pub fn clear_manual(&self, user: &UserId) -> bool {
        self.pinned.write().remove(user).is_some()
    }

    pub fn is_manual(&self, user: &UserId) -> bool {
        self.pinned.read().contains_key(user)
    }
}

fn validate_manual(items: &[ItemId]) -> Result<(), TopFiveError> {
    let mut seen = HashSet::with_capacity(items.len());
    if let Some(dup) = items.iter().find(|id| !seen.insert(*id)) {
        return Err(TopFiveError::DuplicateItem(dup.to_string()));
    }
    if items.len() != TOP_FIVE_SIZE {
        return Err(TopFiveError::WrongLength { got: items.len(), expected: TOP_FIVE_SIZE });
    }
    Ok(())
}
