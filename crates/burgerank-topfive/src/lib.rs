//! # burgerank-topfive — Personal top-five shortlists.
//!
//! [`TopFiveAggregator`] serves each user's five favourite items: a pinned
//! manual list when the user set one, otherwise a list derived from their
//! own reviews with time-decayed weights and held in a [`TtlCache`].

pub mod aggregator;
pub mod cache;
pub mod scoring;

pub use aggregator::TopFiveAggregator;
pub use cache::{CacheLookup, TtlCache};
pub use scoring::{auto_top_five, review_weight};
