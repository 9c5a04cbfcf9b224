//! Statistics strategies behind [`StatisticsSource`].
//!
//! - [`PrecomputedStatistics`] reads the row maintained by the store.
//! - [`RecomputedStatistics`] derives the same figures from raw history.
//! - [`FallbackStatistics`] tries a primary and answers from the fallback
//!   when the primary fails or does not know the item.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use burgerank_core::traits::{RankingStore, RatingHistory, StatisticsSource, VenueDirectory};
use burgerank_core::{ItemId, ItemStatistics, StoreError};

pub struct PrecomputedStatistics<S: ?Sized> {
    store: Arc<S>,
}

impl<S: RankingStore + ?Sized> PrecomputedStatistics<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: RankingStore + ?Sized> StatisticsSource for PrecomputedStatistics<S> {
    fn name(&self) -> &'static str {
        "precomputed"
    }

    fn statistics(
        &self,
        item: &ItemId,
        now: DateTime<Utc>,
    ) -> Result<Option<ItemStatistics>, StoreError> {
        self.store.item_statistics(item, now)
    }
}

/// Derive statistics from the rating history on every call.
///
/// The item's creation time comes from the venue directory; when the item is
/// not catalogued its earliest rating stands in.
pub struct RecomputedStatistics<H: ?Sized, V: ?Sized> {
    history: Arc<H>,
    venues: Arc<V>,
    recent_window_days: i64,
}

impl<H, V> RecomputedStatistics<H, V>
where
    H: RatingHistory + ?Sized,
    V: VenueDirectory + ?Sized,
{
    pub fn new(history: Arc<H>, venues: Arc<V>, recent_window_days: i64) -> Self {
        Self { history, venues, recent_window_days }
    }
}

impl<H, V> StatisticsSource for RecomputedStatistics<H, V>
where
    H: RatingHistory + ?Sized,
    V: VenueDirectory + ?Sized,
{
    fn name(&self) -> &'static str {
        "recomputed"
    }

    fn statistics(
        &self,
        item: &ItemId,
        now: DateTime<Utc>,
    ) -> Result<Option<ItemStatistics>, StoreError> {
        let ratings = self.history.ratings_for_item(item)?;
        let created_at = match self.venues.venue(item)? {
            Some(venue) => venue.created_at,
            None => match ratings.iter().map(|r| r.created_at).min() {
                Some(first) => first,
                None => return Ok(None),
            },
        };
        Ok(Some(ItemStatistics::from_ratings(
            item.clone(),
            created_at,
            &ratings,
            now,
            self.recent_window_days,
        )))
    }
}

pub struct FallbackStatistics<P, F> {
    primary: P,
    fallback: F,
}

impl<P: StatisticsSource, F: StatisticsSource> FallbackStatistics<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: StatisticsSource, F: StatisticsSource> StatisticsSource for FallbackStatistics<P, F> {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    fn statistics(
        &self,
        item: &ItemId,
        now: DateTime<Utc>,
    ) -> Result<Option<ItemStatistics>, StoreError> {
        match self.primary.statistics(item, now) {
            Ok(Some(stats)) => Ok(Some(stats)),
            Ok(None) => {
                debug!(%item, primary = self.primary.name(), fallback = self.fallback.name(), "statistics: primary has no row, trying fallback");
                self.fallback.statistics(item, now)
            }
            Err(e) => {
                warn!(%item, primary = self.primary.name(), fallback = self.fallback.name(), error = %e, "statistics: primary failed, using fallback");
                self.fallback.statistics(item, now)
            }
        }
    }
}
