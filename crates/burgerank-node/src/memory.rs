//! In-memory implementation of every collaborator trait.
//!
//! All state sits behind one `RwLock`, so each write (a rating plus its
//! statistics update) is atomic and two concurrent ratings of the same item
//! cannot lose an update. No persistence: for tests, the CLI and embedding.
//!
//! Statistics rows are refreshed on every write; reads recount the
//! time-dependent `recent_rating_count` against the caller's clock.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use burgerank_core::constants::DEFAULT_RECENCY_WINDOW_DAYS;
use burgerank_core::traits::{RankingStore, RatingHistory, VenueDirectory};
use burgerank_core::{
    EloRating, ItemId, ItemStatistics, MatchRecord, RankingScore, RatingRecord, RatingSubmission,
    StoreError, UserId, Venue, window_start,
};

#[derive(Default)]
struct Inner {
    /// Rating `id` is its index plus one.
    ratings: Vec<RatingRecord>,
    venues: HashMap<ItemId, Venue>,
    statistics: HashMap<ItemId, ItemStatistics>,
    scores: HashMap<ItemId, RankingScore>,
    elo: HashMap<ItemId, EloRating>,
    /// Oldest first.
    matches: Vec<MatchRecord>,
}

impl Inner {
    fn restat(&mut self, item: &ItemId, now: DateTime<Utc>, recent_window_days: i64) -> ItemStatistics {
        let ratings: Vec<RatingRecord> =
            self.ratings.iter().filter(|r| &r.item_id == item).cloned().collect();
        let created_at = self
            .venues
            .get(item)
            .map(|v| v.created_at)
            .or_else(|| ratings.iter().map(|r| r.created_at).min())
            .unwrap_or(now);
        let stats =
            ItemStatistics::from_ratings(item.clone(), created_at, &ratings, now, recent_window_days);
        self.statistics.insert(item.clone(), stats.clone());
        stats
    }

    /// Ratings of each item newer than the recent window ending at `now`.
    fn recent_counts(&self, now: DateTime<Utc>, recent_window_days: i64) -> HashMap<&ItemId, u64> {
        let cutoff = window_start(now, recent_window_days);
        let mut counts = HashMap::new();
        for r in self.ratings.iter().filter(|r| !r.suspicious && r.created_at > cutoff) {
            *counts.entry(&r.item_id).or_insert(0) += 1;
        }
        counts
    }

    fn as_of(stats: &ItemStatistics, recent: &HashMap<&ItemId, u64>) -> ItemStatistics {
        ItemStatistics {
            recent_rating_count: Some(recent.get(&stats.item_id).copied().unwrap_or(0)),
            ..stats.clone()
        }
    }

    fn rating_mut(&mut self, rating_id: u64) -> Result<&mut RatingRecord, StoreError> {
        usize::try_from(rating_id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .and_then(|idx| self.ratings.get_mut(idx))
            .ok_or_else(|| StoreError::NotFound(format!("rating {rating_id}")))
    }
}

pub struct MemoryStore {
    inner: RwLock<Inner>,
    recent_window_days: i64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_recent_window(DEFAULT_RECENCY_WINDOW_DAYS)
    }

    /// A store whose statistics count ratings newer than `days` as recent.
    pub fn with_recent_window(days: i64) -> Self {
        Self { inner: RwLock::new(Inner::default()), recent_window_days: days }
    }

    /// Register or replace an item's venue record.
    pub fn add_venue(&self, venue: Venue) {
        self.inner.write().venues.insert(venue.item_id.clone(), venue);
    }

    /// Moderation: exclude a rating from every statistic. Returns the
    /// item's updated statistics.
    pub fn flag_suspicious(&self, rating_id: u64, at: DateTime<Utc>) -> Result<ItemStatistics, StoreError> {
        let mut inner = self.inner.write();
        let rating = inner.rating_mut(rating_id)?;
        rating.suspicious = true;
        let item = rating.item_id.clone();
        Ok(inner.restat(&item, at, self.recent_window_days))
    }

    /// Record that a review received a like from another user.
    pub fn add_like(&self, rating_id: u64) -> Result<u32, StoreError> {
        let mut inner = self.inner.write();
        let rating = inner.rating_mut(rating_id)?;
        rating.likes = rating.likes.saturating_add(1);
        Ok(rating.likes)
    }

    pub fn rating_count(&self) -> usize {
        self.inner.read().ratings.len()
    }
}

impl RatingHistory for MemoryStore {
    fn ratings_by_user(&self, user: &UserId) -> Result<Vec<RatingRecord>, StoreError> {
        Ok(self.inner.read().ratings.iter().filter(|r| &r.user_id == user).cloned().collect())
    }

    fn ratings_for_item(&self, item: &ItemId) -> Result<Vec<RatingRecord>, StoreError> {
        Ok(self.inner.read().ratings.iter().filter(|r| &r.item_id == item).cloned().collect())
    }

    fn recent_matches(&self, user: &UserId, limit: usize) -> Result<Vec<MatchRecord>, StoreError> {
        Ok(self
            .inner
            .read()
            .matches
            .iter()
            .rev()
            .filter(|m| &m.user_id == user)
            .take(limit)
            .cloned()
            .collect())
    }
}

impl VenueDirectory for MemoryStore {
    fn venue(&self, item: &ItemId) -> Result<Option<Venue>, StoreError> {
        Ok(self.inner.read().venues.get(item).cloned())
    }
}

impl RankingStore for MemoryStore {
    fn record_rating(
        &self,
        submission: &RatingSubmission,
    ) -> Result<(RatingRecord, ItemStatistics), StoreError> {
        let mut inner = self.inner.write();
        let replay = inner.ratings.iter().any(|r| {
            r.user_id == submission.submitter_id
                && r.item_id == submission.item_id
                && r.created_at == submission.submitted_at
        });
        if replay {
            return Err(StoreError::Conflict(format!(
                "{} already rated {} at {}",
                submission.submitter_id, submission.item_id, submission.submitted_at
            )));
        }

        let record = RatingRecord {
            id: inner.ratings.len() as u64 + 1,
            item_id: submission.item_id.clone(),
            user_id: submission.submitter_id.clone(),
            score: submission.score,
            verified: false,
            has_photo: submission.has_photo,
            has_receipt: submission.has_receipt,
            suspicious: false,
            likes: 0,
            created_at: submission.submitted_at,
        };
        inner.ratings.push(record.clone());
        let stats = inner.restat(&submission.item_id, submission.submitted_at, self.recent_window_days);
        Ok((record, stats))
    }

    fn mark_verified(&self, rating_id: u64, at: DateTime<Utc>) -> Result<RatingRecord, StoreError> {
        let mut inner = self.inner.write();
        let rating = inner.rating_mut(rating_id)?;
        rating.verified = true;
        let record = rating.clone();
        inner.restat(&record.item_id, at, self.recent_window_days);
        Ok(record)
    }

    fn item_statistics(
        &self,
        item: &ItemId,
        now: DateTime<Utc>,
    ) -> Result<Option<ItemStatistics>, StoreError> {
        let inner = self.inner.read();
        let Some(stats) = inner.statistics.get(item) else {
            return Ok(None);
        };
        let recent = inner.recent_counts(now, self.recent_window_days);
        Ok(Some(Inner::as_of(stats, &recent)))
    }

    fn statistics_snapshot(&self, now: DateTime<Utc>) -> Result<Vec<ItemStatistics>, StoreError> {
        let inner = self.inner.read();
        let recent = inner.recent_counts(now, self.recent_window_days);
        Ok(inner.statistics.values().map(|stats| Inner::as_of(stats, &recent)).collect())
    }

    fn store_score(&self, score: &RankingScore) -> Result<(), StoreError> {
        self.inner.write().scores.insert(score.item_id.clone(), score.clone());
        Ok(())
    }

    fn ranking_score(&self, item: &ItemId) -> Result<Option<RankingScore>, StoreError> {
        Ok(self.inner.read().scores.get(item).cloned())
    }

    fn all_scores(&self) -> Result<Vec<RankingScore>, StoreError> {
        Ok(self.inner.read().scores.values().cloned().collect())
    }

    fn elo_rating(&self, item: &ItemId) -> Result<Option<EloRating>, StoreError> {
        Ok(self.inner.read().elo.get(item).cloned())
    }

    fn store_elo(&self, rating: &EloRating) -> Result<(), StoreError> {
        self.inner.write().elo.insert(rating.item_id.clone(), rating.clone());
        Ok(())
    }

    fn record_match(&self, record: &MatchRecord) -> Result<(), StoreError> {
        self.inner.write().matches.push(record.clone());
        Ok(())
    }
}
