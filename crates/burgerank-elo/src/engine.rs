//! Logistic Elo update.
//!
//! `E_A = 1 / (1 + 10^((R_B - R_A) / 400))`, `R' = R + K * (S - E)` with
//! `S = 1` for the winner and `0` for the loser. Both sides share one K, so
//! the loser's delta is the exact negation of the winner's.

use std::fmt;

use serde::{Deserialize, Serialize};

use burgerank_core::config::EloConfig;
use burgerank_core::constants::{
    DEFAULT_ELO_K_FACTOR, ELO_BASE_RATING, ELO_DEFAULT_STARS, ELO_LOGISTIC_SCALE, ELO_STAR_RANGE,
    MAX_RATING, MIN_RATING,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    A,
    B,
}

/// Result of one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloUpdate {
    pub new_a: f64,
    pub new_b: f64,
    pub delta_a: f64,
    pub delta_b: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EloEngine {
    k_factor: f64,
}

impl Default for EloEngine {
    fn default() -> Self {
        Self { k_factor: DEFAULT_ELO_K_FACTOR }
    }
}

impl EloEngine {
    pub fn new(k_factor: f64) -> Self {
        Self { k_factor }
    }

    pub fn from_config(config: &EloConfig) -> Self {
        Self::new(config.k_factor)
    }

    pub fn k_factor(&self) -> f64 {
        self.k_factor
    }

    pub fn update(&self, rating_a: f64, rating_b: f64, winner: Winner) -> EloUpdate {
        let expected_a = expected_score(rating_a, rating_b);
        let actual_a = match winner {
            Winner::A => 1.0,
            Winner::B => 0.0,
        };
        let delta_a = self.k_factor * (actual_a - expected_a);
        let delta_b = -delta_a;

        EloUpdate {
            new_a: rating_a + delta_a,
            new_b: rating_b + delta_b,
            delta_a,
            delta_b,
        }
    }
}

/// Expected score of `a` against `b`, in `[0, 1]`.
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / ELO_LOGISTIC_SCALE))
}

/// Starting rating for an item first seen with `stars` in `[0, 5]`:
/// `1200 + stars / 5 * 400`. Out-of-scale input is clamped.
pub fn initial_rating(stars: f64) -> f64 {
    let stars = if stars.is_finite() { stars.clamp(MIN_RATING, MAX_RATING) } else { MIN_RATING };
    ELO_BASE_RATING + stars / MAX_RATING * ELO_STAR_RANGE
}

/// Rating assumed for an item that has never been compared and has no
/// first-impression stars to seed from.
pub fn default_rating() -> f64 {
    initial_rating(ELO_DEFAULT_STARS)
}

/// `E_A` as a whole percentage, for display.
pub fn win_probability(rating_a: f64, rating_b: f64) -> u8 {
    (expected_score(rating_a, rating_b) * 100.0).round() as u8
}

/// Descriptive band of a rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RatingBand {
    Novato,
    Principiante,
    Intermedio,
    Avanzado,
    Experto,
    Maestro,
}

impl RatingBand {
    pub fn for_rating(rating: f64) -> Self {
        match rating {
            r if r < 1000.0 => Self::Novato,
            r if r < 1200.0 => Self::Principiante,
            r if r < 1400.0 => Self::Intermedio,
            r if r < 1600.0 => Self::Avanzado,
            r if r < 1800.0 => Self::Experto,
            _ => Self::Maestro,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Novato => "Novato",
            Self::Principiante => "Principiante",
            Self::Intermedio => "Intermedio",
            Self::Avanzado => "Avanzado",
            Self::Experto => "Experto",
            Self::Maestro => "Maestro",
        }
    }
}

impl fmt::Display for RatingBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
