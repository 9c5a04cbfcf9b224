//! Error types for BurgeRank.
//!
//! Admission and top-five errors are shown to end users verbatim, so their
//! messages are written in the product language (Spanish).
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("rating {0} outside [0, 5]")] RatingOutOfRange(f64),
    #[error("rating {0} is not a multiple of 0.5")] RatingNotHalfStep(f64),
    #[error("empty item id")] EmptyItemId,
    #[error("empty submitter id")] EmptySubmitterId,
    #[error("invalid coordinates: lat {lat}, lng {lng}")] InvalidCoordinates { lat: f64, lng: f64 },
    #[error("submission timestamp is in the future")] FutureTimestamp,
    #[error("item {0} cannot be compared with itself")] SelfComparison(String),
    #[error("winner {0} is not one of the compared items")] WinnerNotInMatch(String),
}

/// Why an integrity check refused a submission.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AdmissionError {
    #[error("Has alcanzado el límite de {limit} valoraciones por día")] RateLimitExceeded { limit: u32 },
    #[error("Ya has valorado esta burger recientemente. Intenta en {window_days} días")] DuplicateSubmission { window_days: i64 },
    #[error("Debes estar dentro de {radius_km}km del restaurante para valorar")] GeofenceViolation { radius_km: f64, distance_km: f64 },
    #[error("Error al verificar límite")] LimitCheckUnavailable,
    #[error("Error al verificar reviews previas")] DuplicateCheckUnavailable,
    #[error("Valoración no válida: {0}")] Malformed(String),
    #[error("No se pudo registrar la valoración: {0}")] WriteConflict(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopFiveError {
    #[error("El top 5 debe tener exactamente {expected} burgers (recibidas {got})")] WrongLength { got: usize, expected: usize },
    #[error("No puedes tener la misma burger dos veces en el top 5: {0}")] DuplicateItem(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found: {0}")] NotFound(String),
    #[error("unavailable: {0}")] Unavailable(String),
    #[error("write conflict: {0}")] Conflict(String),
}

/// A score factor that fell back to its neutral default for lack of data.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DegradedFactor {
    #[error("no ratings: bayesian mean fell back to the prior")] BayesianMean,
    #[error("no ratings: wilson score is zero")] Wilson,
    #[error("no ratings: verification factor is neutral")] Verification,
    #[error("standard deviation unknown: variance penalty is neutral")] Variance,
    #[error("recent rating count unknown: recency factor is neutral")] Recency,
}

#[derive(Error, Debug)]
pub enum RankError {
    #[error(transparent)] Validation(#[from] ValidationError),
    #[error(transparent)] TopFive(#[from] TopFiveError),
    #[error(transparent)] Store(#[from] StoreError),
    #[error("config: {0}")] Config(String),
}

impl From<::config::ConfigError> for RankError {
    fn from(e: ::config::ConfigError) -> Self {
        RankError::Config(e.to_string())
    }
}
