//! Cross-crate test suite for BurgeRank.
//!
//! Integration tests drive the full submission pipeline over the in-memory
//! store; adversarial tests throw randomized inputs at every ranking and
//! admission invariant.

pub mod helpers;
