//! Tunable ranking parameters.
//!
//! Provides [`RankingConfig`] with defaults from [`crate::constants`]. A
//! config can be built programmatically or layered from an optional file and
//! `BURGERANK__`-prefixed environment variables via [`RankingConfig::load`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::RankError;

/// Global tunables. Read-only to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RankingConfig {
    pub score: ScoreConfig,
    pub elo: EloConfig,
    pub integrity: IntegrityConfig,
    pub top_five: TopFiveConfig,
}

/// Score composition parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Ratings needed before an item is ranked.
    pub min_for_ranking: u64,
    pub prior_mean: f64,
    /// Prior strength in virtual ratings.
    pub prior_weight: f64,
    /// Share of the (rescaled) Wilson score in the base component, `[0, 1]`.
    pub wilson_blend: f64,
    pub novelty_window_days: i64,
    pub recency_window_days: i64,
    /// Upper clamp of the composite score.
    pub score_ceiling: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            min_for_ranking: DEFAULT_MIN_FOR_RANKING,
            prior_mean: DEFAULT_PRIOR_MEAN,
            prior_weight: DEFAULT_PRIOR_WEIGHT,
            wilson_blend: DEFAULT_WILSON_BLEND,
            novelty_window_days: DEFAULT_NOVELTY_WINDOW_DAYS,
            recency_window_days: DEFAULT_RECENCY_WINDOW_DAYS,
            score_ceiling: DEFAULT_SCORE_CEILING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EloConfig {
    pub k_factor: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self { k_factor: DEFAULT_ELO_K_FACTOR }
    }
}

/// Anti-spam gate parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    /// Accepted ratings per user per local day.
    pub daily_limit: u32,
    pub duplicate_window_days: i64,
    /// Disable for deployments that do not collect submitter location.
    pub geofence_enabled: bool,
    pub geofence_radius_km: f64,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            daily_limit: DEFAULT_DAILY_LIMIT,
            duplicate_window_days: DEFAULT_DUPLICATE_WINDOW_DAYS,
            geofence_enabled: true,
            geofence_radius_km: DEFAULT_GEOFENCE_RADIUS_KM,
        }
    }
}

/// Personal shortlist parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopFiveConfig {
    pub cache_ttl_secs: u64,
    pub review_decay_days: f64,
    pub review_weight_floor: f64,
}

impl Default for TopFiveConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_TOP_FIVE_TTL.as_secs(),
            review_decay_days: DEFAULT_REVIEW_DECAY_DAYS,
            review_weight_floor: DEFAULT_REVIEW_WEIGHT_FLOOR,
        }
    }
}

impl TopFiveConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl RankingConfig {
    /// Layer defaults, an optional config file, then environment variables
    /// (`BURGERANK__SCORE__PRIOR_MEAN=3.0`), and validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self, RankError> {
        let mut builder =
            ::config::Config::builder().add_source(::config::Config::try_from(&Self::default())?);
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix("BURGERANK")
                .separator("__")
                .try_parsing(true),
        );

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject parameter combinations the algorithms cannot work with.
    pub fn validate(&self) -> Result<(), RankError> {
        let s = &self.score;
        if !(0.0..=1.0).contains(&s.wilson_blend) {
            return Err(invalid(format!("score.wilson_blend {} outside [0, 1]", s.wilson_blend)));
        }
        if !(s.prior_weight >= 0.0) {
            return Err(invalid(format!("score.prior_weight {} is negative", s.prior_weight)));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&s.prior_mean) {
            return Err(invalid(format!("score.prior_mean {} outside [0, 5]", s.prior_mean)));
        }
        if !(s.score_ceiling > 0.0) {
            return Err(invalid("score.score_ceiling must be positive".into()));
        }
        for (name, days) in [
            ("score.novelty_window_days", s.novelty_window_days),
            ("score.recency_window_days", s.recency_window_days),
        ] {
            check_window(name, days)?;
        }
        if !(self.elo.k_factor > 0.0) {
            return Err(invalid("elo.k_factor must be positive".into()));
        }
        let i = &self.integrity;
        if i.daily_limit == 0 {
            return Err(invalid("integrity.daily_limit must be at least 1".into()));
        }
        check_window("integrity.duplicate_window_days", i.duplicate_window_days)?;
        if !(i.geofence_radius_km > 0.0) {
            return Err(invalid("integrity.geofence_radius_km must be positive".into()));
        }
        let t = &self.top_five;
        if t.cache_ttl_secs == 0 {
            return Err(invalid("top_five.cache_ttl_secs must be positive".into()));
        }
        if !(t.review_decay_days > 0.0) || !(0.0..=1.0).contains(&t.review_weight_floor) {
            return Err(invalid("top_five decay parameters out of range".into()));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> RankError {
    RankError::Config(msg)
}

fn check_window(name: &str, days: i64) -> Result<(), RankError> {
    if !(0..=MAX_WINDOW_DAYS).contains(&days) {
        return Err(invalid(format!("{name} {days} outside [0, {MAX_WINDOW_DAYS}]")));
    }
    Ok(())
}
