//! Ranking constants. Every tunable default and every "no data" fallback
//! lives here so call sites never invent their own.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Rating scale
// ---------------------------------------------------------------------------

/// Lowest accepted rating value.
pub const MIN_RATING: f64 = 0.0;
/// Highest accepted rating value.
pub const MAX_RATING: f64 = 5.0;
/// Ratings are whole or half stars.
pub const RATING_STEP: f64 = 0.5;
/// A rating at or above this value counts as positive.
pub const POSITIVE_RATING_THRESHOLD: f64 = 4.0;

// ---------------------------------------------------------------------------
// Score composition
// ---------------------------------------------------------------------------

/// Minimum number of ratings before an item enters the ranking.
pub const DEFAULT_MIN_FOR_RANKING: u64 = 5;
/// Global prior mean the Bayesian average is pulled toward.
pub const DEFAULT_PRIOR_MEAN: f64 = 3.5;
/// Weight of the prior, expressed as a number of virtual ratings.
pub const DEFAULT_PRIOR_WEIGHT: f64 = 10.0;
/// Share of the Wilson score in the blended base component.
///
/// `0.0` ranks purely on the Bayesian mean. The Wilson score (a proportion in
/// `[0, 1]`) is rescaled to the rating scale before blending.
pub const DEFAULT_WILSON_BLEND: f64 = 0.0;
/// Two-sided 95% normal quantile used by the Wilson lower bound.
pub const WILSON_Z: f64 = 1.96;

/// Maximum bonus from verified ratings (`1 + share * bonus`).
pub const VERIFICATION_BONUS: f64 = 0.15;
/// Upper bound of the verification factor.
pub const VERIFICATION_FACTOR_CAP: f64 = 1.0 + VERIFICATION_BONUS;

/// Items younger than this receive the novelty boost.
pub const DEFAULT_NOVELTY_WINDOW_DAYS: i64 = 30;
pub const NOVELTY_BOOST: f64 = 1.1;

/// Standard deviation below which ratings are considered consistent.
pub const VARIANCE_LOW_STDDEV: f64 = 0.5;
/// Standard deviation up to which ratings are considered mildly spread.
pub const VARIANCE_MID_STDDEV: f64 = 1.0;
pub const VARIANCE_PENALTY_MID: f64 = 0.95;
pub const VARIANCE_PENALTY_HIGH: f64 = 0.85;

/// Window that defines a "recent" rating for the recency factor.
pub const DEFAULT_RECENCY_WINDOW_DAYS: i64 = 30;
/// Recent ratings must exceed this share of all ratings to earn the boost.
pub const RECENCY_SHARE_THRESHOLD: f64 = 0.3;
pub const RECENCY_BOOST: f64 = 1.05;

/// Longest day window any config section may set (about a century).
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Neutral value of every multiplicative factor. Any factor that cannot be
/// computed from the available data falls back to this.
pub const NEUTRAL_FACTOR: f64 = 1.0;

/// Composite scores are clamped to `[0, SCORE_CEILING]`.
pub const DEFAULT_SCORE_CEILING: f64 = 10.0;
/// Composite scores are rounded to this many decimal places.
pub const SCORE_DECIMALS: i32 = 4;

// ---------------------------------------------------------------------------
// Elo
// ---------------------------------------------------------------------------

pub const DEFAULT_ELO_K_FACTOR: f64 = 32.0;
/// Elo rating of a zero-star first impression.
pub const ELO_BASE_RATING: f64 = 1200.0;
/// Elo span covered by the 0-5 star scale.
pub const ELO_STAR_RANGE: f64 = 400.0;
/// Logistic scale of the expected-score curve.
pub const ELO_LOGISTIC_SCALE: f64 = 400.0;
/// Star value assumed for items that were never compared.
pub const ELO_DEFAULT_STARS: f64 = 4.0;
/// Number of a user's most recent matches whose pairs are not offered again.
pub const RECENT_MATCH_MEMORY: usize = 20;
/// Random draws attempted before accepting a recently seen pair.
pub const MATCH_PAIR_ATTEMPTS: usize = 10;

// ---------------------------------------------------------------------------
// Integrity
// ---------------------------------------------------------------------------

/// Accepted ratings allowed per user per local day.
pub const DEFAULT_DAILY_LIMIT: u32 = 3;
/// A user may not rate the same item twice within this window.
pub const DEFAULT_DUPLICATE_WINDOW_DAYS: i64 = 7;
/// Maximum distance between submitter and venue.
pub const DEFAULT_GEOFENCE_RADIUS_KM: f64 = 5.0;
/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// ---------------------------------------------------------------------------
// Top five
// ---------------------------------------------------------------------------

/// Size of a user's personal shortlist.
pub const TOP_FIVE_SIZE: usize = 5;
/// Cached shortlists younger than this are served as-is.
pub const DEFAULT_TOP_FIVE_TTL: Duration = Duration::from_secs(60 * 60);
/// Weight of a review's star rating in the personal score.
pub const TOP_FIVE_RATING_WEIGHT: f64 = 0.6;
/// Weight of each like a review received.
pub const TOP_FIVE_LIKES_WEIGHT: f64 = 0.1;
/// Reviews lose weight linearly over this horizon.
pub const DEFAULT_REVIEW_DECAY_DAYS: f64 = 365.0;
/// Old reviews never weigh less than this.
pub const DEFAULT_REVIEW_WEIGHT_FLOOR: f64 = 0.5;
