//! Plain data records exchanged between the ranking core and its collaborators.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_RATING, MIN_RATING, POSITIVE_RATING_THRESHOLD, RATING_STEP};
use crate::error::{DegradedFactor, ValidationError};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of a rated food item.
    ItemId
);
string_id!(
    /// Identifier of a user (submitter, reviewer, match player).
    UserId
);

// ---------------------------------------------------------------------------
// Geography
// ---------------------------------------------------------------------------

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// The venue an item is served at, as known to the catalogue collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub item_id: ItemId,
    /// `None` when the venue was registered without coordinates.
    pub location: Option<GeoPoint>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

/// A rating as submitted by a user, before admission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSubmission {
    pub item_id: ItemId,
    pub submitter_id: UserId,
    /// Stars in `[0, 5]`, whole or half.
    pub score: f64,
    #[serde(default)]
    pub has_photo: bool,
    #[serde(default)]
    pub has_receipt: bool,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

impl RatingSubmission {
    /// Check the shape of the submission. Runs before any integrity check.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), ValidationError> {
        if self.item_id.is_empty() {
            return Err(ValidationError::EmptyItemId);
        }
        if self.submitter_id.is_empty() {
            return Err(ValidationError::EmptySubmitterId);
        }
        validate_rating(self.score)?;
        if let Some(loc) = self.location {
            if !loc.is_valid() {
                return Err(ValidationError::InvalidCoordinates { lat: loc.lat, lng: loc.lng });
            }
        }
        if self.submitted_at > now {
            return Err(ValidationError::FutureTimestamp);
        }
        Ok(())
    }
}

/// Validate a star value against the rating scale.
pub fn validate_rating(score: f64) -> Result<(), ValidationError> {
    if !score.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&score) {
        return Err(ValidationError::RatingOutOfRange(score));
    }
    if (score / RATING_STEP).fract() != 0.0 {
        return Err(ValidationError::RatingNotHalfStep(score));
    }
    Ok(())
}

/// An accepted, persisted rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub id: u64,
    pub item_id: ItemId,
    pub user_id: UserId,
    pub score: f64,
    /// Set by verification marking after a photo or receipt check.
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub has_photo: bool,
    #[serde(default)]
    pub has_receipt: bool,
    /// Flagged by moderation; excluded from every statistic.
    #[serde(default)]
    pub suspicious: bool,
    /// Likes the review received from other users.
    #[serde(default)]
    pub likes: u32,
    pub created_at: DateTime<Utc>,
}

impl RatingRecord {
    pub fn is_positive(&self) -> bool {
        self.score >= POSITIVE_RATING_THRESHOLD
    }
}

// ---------------------------------------------------------------------------
// Statistics and scores
// ---------------------------------------------------------------------------

/// Aggregate rating statistics of one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStatistics {
    pub item_id: ItemId,
    pub total_rating_count: u64,
    pub verified_rating_count: u64,
    /// Ratings with a score of 4 or more.
    pub positive_rating_count: u64,
    /// Ratings inside the recency window. `None` when the source cannot tell.
    #[serde(default)]
    pub recent_rating_count: Option<u64>,
    pub mean_rating: f64,
    /// Population standard deviation. `None` when the source cannot tell.
    #[serde(default)]
    pub std_deviation: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_rating_at: Option<DateTime<Utc>>,
}

impl ItemStatistics {
    /// Statistics of an item nobody has rated yet.
    pub fn empty(item_id: ItemId, created_at: DateTime<Utc>) -> Self {
        Self {
            item_id,
            total_rating_count: 0,
            verified_rating_count: 0,
            positive_rating_count: 0,
            recent_rating_count: Some(0),
            mean_rating: 0.0,
            std_deviation: Some(0.0),
            created_at,
            last_rating_at: None,
        }
    }
}

/// The multiplicative corrections applied on top of the base component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreFactors {
    pub verification: f64,
    pub novelty: f64,
    pub variance: f64,
    pub recency: f64,
}

impl ScoreFactors {
    pub fn product(&self) -> f64 {
        self.verification * self.novelty * self.variance * self.recency
    }
}

/// Derived ranking score of one item. Never edited by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingScore {
    pub item_id: ItemId,
    pub composite_score: f64,
    pub bayesian_score: f64,
    pub wilson_score: f64,
    pub factors: ScoreFactors,
    /// 1-based ordinal among eligible items; assigned by rank ordering.
    pub rank_position: Option<u32>,
    /// True once the item has enough ratings to be ranked.
    pub eligible: bool,
    /// Tie-breaking inputs carried along from the statistics.
    pub total_rating_count: u64,
    pub created_at: DateTime<Utc>,
    /// Factors that fell back to their neutral default.
    #[serde(default)]
    pub degraded: Vec<DegradedFactor>,
}

// ---------------------------------------------------------------------------
// Pairwise comparisons
// ---------------------------------------------------------------------------

/// Comparative rating of an item, created lazily on its first comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EloRating {
    pub item_id: ItemId,
    pub rating: f64,
    pub updated_at: DateTime<Utc>,
}

/// One head-to-head comparison played by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub user_id: UserId,
    pub item_a: ItemId,
    pub item_b: ItemId,
    pub winner: ItemId,
    pub rating_a_before: f64,
    pub rating_b_before: f64,
    pub rating_a_after: f64,
    pub rating_b_after: f64,
    pub created_at: DateTime<Utc>,
}

impl MatchRecord {
    /// Order-insensitive key of the compared pair.
    pub fn pair_key(&self) -> (ItemId, ItemId) {
        pair_key(&self.item_a, &self.item_b)
    }
}

/// Order-insensitive key of two items.
pub fn pair_key(a: &ItemId, b: &ItemId) -> (ItemId, ItemId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

// ---------------------------------------------------------------------------
// Personal shortlist
// ---------------------------------------------------------------------------

/// A user's ordered shortlist of at most five distinct items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTopFive {
    pub user_id: UserId,
    pub items: Vec<ItemId>,
    pub is_manual: bool,
    /// Anchor of the cache TTL.
    pub computed_at: DateTime<Utc>,
}
