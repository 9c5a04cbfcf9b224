//! # burgerank-node — Composition of the ranking core.
//!
//! - [`pipeline::RankingOrchestrator`] — drives one submission from
//!   admission to publication, plus comparisons, verification and reads
//! - [`recompute::recompute_rankings`] — batch re-scoring over a snapshot
//! - [`memory::MemoryStore`] — in-memory reference collaborator

pub mod memory;
pub mod pipeline;
pub mod recompute;

pub use memory::MemoryStore;
pub use pipeline::{
    ComparisonOutcome, MatchProposal, RankingOrchestrator, SubmissionOutcome, SubmissionState,
};
pub use recompute::recompute_rankings;
