//! Individual admission checks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use burgerank_core::config::IntegrityConfig;
use burgerank_core::traits::{RatingHistory, VenueDirectory};
use burgerank_core::{AdmissionError, RatingSubmission, window_start};

use crate::geo::haversine_km;
use crate::verdict::{CheckMetadata, Verdict};

/// Clock inputs shared by every check of one admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckContext {
    pub now: DateTime<Utc>,
    /// Start of the submitter's local day, as decided by the caller.
    pub day_start: DateTime<Utc>,
}

impl CheckContext {
    pub fn new(now: DateTime<Utc>, day_start: DateTime<Utc>) -> Self {
        Self { now, day_start }
    }
}

/// One independent admission rule.
///
/// Implementations only read collaborator state. A collaborator failure is
/// turned into a [`Verdict`] by the check itself, never propagated.
pub trait AdmissionCheck: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, submission: &RatingSubmission, ctx: &CheckContext) -> Verdict;
}

// ---------------------------------------------------------------------------
// Daily limit
// ---------------------------------------------------------------------------

/// At most `limit` accepted ratings per submitter per local day.
pub struct DailyLimitCheck<H: ?Sized> {
    history: Arc<H>,
    limit: u32,
}

impl<H: RatingHistory + ?Sized> DailyLimitCheck<H> {
    pub fn new(history: Arc<H>, limit: u32) -> Self {
        Self { history, limit }
    }
}

impl<H: RatingHistory + ?Sized> AdmissionCheck for DailyLimitCheck<H> {
    fn name(&self) -> &'static str {
        "daily_limit"
    }

    fn check(&self, submission: &RatingSubmission, ctx: &CheckContext) -> Verdict {
        let today = match self.history.ratings_by_user_since(&submission.submitter_id, ctx.day_start) {
            Ok(r) => r.len(),
            Err(e) => {
                warn!(user = %submission.submitter_id, error = %e, "integrity: daily limit lookup failed");
                return Verdict::Rejected(AdmissionError::LimitCheckUnavailable);
            }
        };
        let used = u32::try_from(today).unwrap_or(u32::MAX);

        if used >= self.limit {
            debug!(user = %submission.submitter_id, used, limit = self.limit, "integrity: daily limit reached");
            return Verdict::Rejected(AdmissionError::RateLimitExceeded { limit: self.limit });
        }
        Verdict::Allowed(CheckMetadata {
            remaining_today: Some(self.limit - used),
            distance_km: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Duplicate suppression
// ---------------------------------------------------------------------------

/// No second rating of the same item by the same user within the window.
pub struct DuplicateCheck<H: ?Sized> {
    history: Arc<H>,
    window_days: i64,
}

impl<H: RatingHistory + ?Sized> DuplicateCheck<H> {
    pub fn new(history: Arc<H>, window_days: i64) -> Self {
        Self { history, window_days }
    }
}

impl<H: RatingHistory + ?Sized> AdmissionCheck for DuplicateCheck<H> {
    fn name(&self) -> &'static str {
        "duplicate"
    }

    fn check(&self, submission: &RatingSubmission, ctx: &CheckContext) -> Verdict {
        let since = window_start(ctx.now, self.window_days);
        match self.history.ratings_by_user_for_item_since(
            &submission.submitter_id,
            &submission.item_id,
            since,
        ) {
            Ok(previous) if previous.is_empty() => Verdict::allowed(),
            Ok(previous) => {
                debug!(
                    user = %submission.submitter_id,
                    item = %submission.item_id,
                    previous = previous.len(),
                    "integrity: duplicate inside window"
                );
                Verdict::Rejected(AdmissionError::DuplicateSubmission { window_days: self.window_days })
            }
            Err(e) => {
                warn!(user = %submission.submitter_id, error = %e, "integrity: duplicate lookup failed");
                Verdict::Rejected(AdmissionError::DuplicateCheckUnavailable)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Geofence
// ---------------------------------------------------------------------------

/// Submitter must be within `radius_km` of the venue.
///
/// Fails open: a submission without coordinates, an unknown venue, a venue
/// without coordinates or a failed lookup are all allowed.
pub struct GeofenceCheck<V: ?Sized> {
    venues: Arc<V>,
    radius_km: f64,
}

impl<V: VenueDirectory + ?Sized> GeofenceCheck<V> {
    pub fn new(venues: Arc<V>, radius_km: f64) -> Self {
        Self { venues, radius_km }
    }
}

impl<V: VenueDirectory + ?Sized> AdmissionCheck for GeofenceCheck<V> {
    fn name(&self) -> &'static str {
        "geofence"
    }

    fn check(&self, submission: &RatingSubmission, _ctx: &CheckContext) -> Verdict {
        let Some(user_at) = submission.location else {
            debug!(item = %submission.item_id, "integrity: no submitter location, geofence skipped");
            return Verdict::allowed();
        };
        let venue_at = match self.venues.venue(&submission.item_id) {
            Ok(Some(venue)) => venue.location,
            Ok(None) => None,
            Err(e) => {
                warn!(item = %submission.item_id, error = %e, "integrity: venue lookup failed, geofence fails open");
                return Verdict::allowed();
            }
        };
        let Some(venue_at) = venue_at else {
            warn!(item = %submission.item_id, "integrity: venue has no coordinates, geofence fails open");
            return Verdict::allowed();
        };

        let distance_km = haversine_km(user_at, venue_at);
        if distance_km > self.radius_km {
            debug!(item = %submission.item_id, distance_km, radius_km = self.radius_km, "integrity: outside geofence");
            return Verdict::Rejected(AdmissionError::GeofenceViolation {
                radius_km: self.radius_km,
                distance_km,
            });
        }
        Verdict::Allowed(CheckMetadata { remaining_today: None, distance_km: Some(distance_km) })
    }
}

/// The standard check set for `config`, in evaluation order.
pub fn standard_checks<H, V>(
    history: Arc<H>,
    venues: Arc<V>,
    config: &IntegrityConfig,
) -> Vec<Box<dyn AdmissionCheck>>
where
    H: RatingHistory + ?Sized + 'static,
    V: VenueDirectory + ?Sized + 'static,
{
    let mut checks: Vec<Box<dyn AdmissionCheck>> = vec![
        Box::new(DailyLimitCheck::new(history.clone(), config.daily_limit)),
        Box::new(DuplicateCheck::new(history, config.duplicate_window_days)),
    ];
    if config.geofence_enabled {
        checks.push(Box::new(GeofenceCheck::new(venues, config.geofence_radius_km)));
    }
    checks
}
