//! # burgerank-core
//! Foundation types, collaborator traits and tunables shared by every
//! BurgeRank component.

pub mod config;
pub mod constants;
pub mod error;
pub mod stats;
pub mod traits;
pub mod types;

pub use config::RankingConfig;
pub use error::{
    AdmissionError, DegradedFactor, RankError, StoreError, TopFiveError, ValidationError,
};
pub use stats::window_start;
pub use types::{
    EloRating, GeoPoint, ItemId, ItemStatistics, MatchRecord, RankingScore, RatingRecord,
    RatingSubmission, UserId, UserTopFive, Venue,
};
