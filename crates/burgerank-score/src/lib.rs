//! # burgerank-score — Composite ranking score computation.
//!
//! Turns an item's rating statistics into a single ranking figure:
//! - **Base component**: a configurable blend of the Bayesian-adjusted mean
//!   and the Wilson lower bound on the positive-rating share.
//! - **Corrective factors**: verification, novelty, variance and recency
//!   multipliers, each falling back to `1.0` when its input is missing.
//! - **Rank ordering**: eligible items sorted by score, then rating count,
//!   then age.
//! - **Statistics sources**: precomputed rows with a recompute-from-history
//!   fallback behind one trait.

pub mod details;
pub mod engine;
pub mod estimators;
pub mod factors;
pub mod ordering;
pub mod source;

pub use details::{RankingDetails, RatingDistribution};
pub use engine::{ScoreCalculator, compute_score};
pub use estimators::{bayesian_mean, wilson_lower_bound};
pub use ordering::{assign_ranks, leaderboard};
pub use source::{FallbackStatistics, PrecomputedStatistics, RecomputedStatistics};
