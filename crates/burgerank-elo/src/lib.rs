//! # burgerank-elo — Head-to-head comparison ratings.
//!
//! [`EloEngine`] applies the logistic Elo update to a pair of ratings after
//! a binary outcome; [`matchmaking`] picks which two of a user's rated items
//! to put in front of them next.

pub mod engine;
pub mod matchmaking;

pub use engine::{
    EloEngine, EloUpdate, RatingBand, Winner, default_rating, expected_score, initial_rating,
    win_probability,
};
pub use matchmaking::{MatchPair, pick_match_pair};
