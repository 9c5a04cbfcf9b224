//! Shared builders for the integration tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

use burgerank_core::{GeoPoint, ItemId, RankingConfig, RatingSubmission, UserId, Venue};
use burgerank_integrity::{CheckContext, local_day_start};
use burgerank_node::{MemoryStore, RankingOrchestrator};

/// Puerta del Sol.
pub const MADRID: GeoPoint = GeoPoint { lat: 40.4168, lng: -3.7038 };
/// Plaça de Catalunya.
pub const BARCELONA: GeoPoint = GeoPoint { lat: 41.3874, lng: 2.1686 };

/// Fixed reference instant: Monday 2024-06-10 12:00 UTC.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
}

/// Madrid in summer.
pub fn cest() -> FixedOffset {
    FixedOffset::east_opt(2 * 3600).unwrap()
}

/// A point roughly `km` north of `origin`.
pub fn north_of(origin: GeoPoint, km: f64) -> GeoPoint {
    GeoPoint::new(origin.lat + km / 111.195, origin.lng)
}

/// Venue in central Madrid, opened a year before [`t0`].
pub fn madrid_venue(item: &str) -> Venue {
    Venue { item_id: ItemId::new(item), location: Some(MADRID), created_at: t0() - Duration::days(365) }
}

/// Orchestrator over a fresh store with `items` registered as Madrid venues.
pub fn orchestrator_with(items: &[&str], config: RankingConfig) -> RankingOrchestrator<MemoryStore> {
    let store = Arc::new(MemoryStore::with_recent_window(config.score.recency_window_days));
    for item in items {
        store.add_venue(madrid_venue(item));
    }
    RankingOrchestrator::new(store, config)
}

/// A submission made on site (100 m from the Madrid venues).
pub fn on_site(user: &str, item: &str, score: f64, at: DateTime<Utc>) -> RatingSubmission {
    RatingSubmission {
        item_id: ItemId::new(item),
        submitter_id: UserId::new(user),
        score,
        has_photo: false,
        has_receipt: false,
        submitted_at: at,
        location: Some(north_of(MADRID, 0.1)),
    }
}

/// Check context at `now` for a submitter in `offset`.
pub fn context(now: DateTime<Utc>, offset: FixedOffset) -> CheckContext {
    CheckContext::new(now, local_day_start(now, offset))
}
