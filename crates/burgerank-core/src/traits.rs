//! Trait interfaces between the ranking core and its collaborators.
//!
//! - [`RatingHistory`] — read access to accepted ratings and matches
//! - [`VenueDirectory`] — item/venue catalogue (coordinates, creation time)
//! - [`RankingStore`] — persistence write path for statistics, scores and Elo
//! - [`StatisticsSource`] — where the score calculator gets its statistics
//!
//! The core never performs I/O itself; everything below is implemented by
//! the host service (or by `burgerank-node`'s in-memory store in tests).

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::types::{
    EloRating, ItemId, ItemStatistics, MatchRecord, RankingScore, RatingRecord, RatingSubmission,
    UserId, Venue,
};

/// Read-only view of the rating history.
pub trait RatingHistory: Send + Sync {
    /// Every accepted rating the user has submitted, in any order.
    fn ratings_by_user(&self, user: &UserId) -> Result<Vec<RatingRecord>, StoreError>;

    /// Every accepted rating of an item, in any order.
    fn ratings_for_item(&self, item: &ItemId) -> Result<Vec<RatingRecord>, StoreError>;

    /// The user's ratings created at or after `since`.
    ///
    /// Default implementation filters [`ratings_by_user`](Self::ratings_by_user).
    fn ratings_by_user_since(
        &self,
        user: &UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<RatingRecord>, StoreError> {
        Ok(self
            .ratings_by_user(user)?
            .into_iter()
            .filter(|r| r.created_at >= since)
            .collect())
    }

    /// The user's ratings of one item created at or after `since`.
    fn ratings_by_user_for_item_since(
        &self,
        user: &UserId,
        item: &ItemId,
        since: DateTime<Utc>,
    ) -> Result<Vec<RatingRecord>, StoreError> {
        Ok(self
            .ratings_by_user_since(user, since)?
            .into_iter()
            .filter(|r| &r.item_id == item)
            .collect())
    }

    /// The user's most recent matches, newest first, at most `limit`.
    /// Default implementation reports no match history.
    fn recent_matches(&self, _user: &UserId, _limit: usize) -> Result<Vec<MatchRecord>, StoreError> {
        Ok(Vec::new())
    }
}

/// Item catalogue lookups.
pub trait VenueDirectory: Send + Sync {
    /// Venue record of an item. `None` if the item is unknown.
    fn venue(&self, item: &ItemId) -> Result<Option<Venue>, StoreError>;
}

/// Persistence write path.
///
/// Implementations must serialize writes per row (or merge idempotently):
/// two concurrent ratings of the same item must not lose an update.
pub trait RankingStore: Send + Sync {
    /// Durably record an accepted rating and update the item's statistics in
    /// one atomic step. Returns the stored record and the new statistics.
    ///
    /// A [`StoreError::Conflict`] means the write was refused (for example a
    /// replayed submission) and nothing changed.
    ///
    /// Admission runs before this call and is not part of the write: two
    /// concurrent submissions by one user can both pass the daily-limit and
    /// duplicate checks. Stores that need a hard quota must re-assert it here
    /// and answer [`StoreError::Conflict`].
    fn record_rating(
        &self,
        submission: &RatingSubmission,
    ) -> Result<(RatingRecord, ItemStatistics), StoreError>;

    /// Flip a stored rating to verified. Returns the updated record.
    fn mark_verified(&self, rating_id: u64, at: DateTime<Utc>) -> Result<RatingRecord, StoreError>;

    /// Precomputed statistics of an item as of `now`. `None` if never rated.
    ///
    /// Time-dependent figures (`recent_rating_count`) must be counted against
    /// `now`, not against the time the row was last written.
    fn item_statistics(
        &self,
        item: &ItemId,
        now: DateTime<Utc>,
    ) -> Result<Option<ItemStatistics>, StoreError>;

    /// Consistent copy of every item's statistics as of `now`, for batch
    /// recomputation. Same time rules as [`item_statistics`](Self::item_statistics).
    fn statistics_snapshot(&self, now: DateTime<Utc>) -> Result<Vec<ItemStatistics>, StoreError>;

    fn store_score(&self, score: &RankingScore) -> Result<(), StoreError>;

    fn ranking_score(&self, item: &ItemId) -> Result<Option<RankingScore>, StoreError>;

    /// Every stored ranking score, in any order.
    fn all_scores(&self) -> Result<Vec<RankingScore>, StoreError>;

    fn elo_rating(&self, item: &ItemId) -> Result<Option<EloRating>, StoreError>;

    fn store_elo(&self, rating: &EloRating) -> Result<(), StoreError>;

    fn record_match(&self, record: &MatchRecord) -> Result<(), StoreError>;
}

/// Source of item statistics for score computation.
///
/// Several implementations can stand behind one contract (a precomputed row,
/// a recomputation from history); callers never learn which one answered.
pub trait StatisticsSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Statistics of `item` as of `now`. `None` if the item is unknown.
    fn statistics(
        &self,
        item: &ItemId,
        now: DateTime<Utc>,
    ) -> Result<Option<ItemStatistics>, StoreError>;
}
