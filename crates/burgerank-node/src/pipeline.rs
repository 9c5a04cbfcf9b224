//! Submission orchestration.
//!
//! ```text
//! Submitted ──admission──▶ Validated ──write──▶ Persisted ──score──▶ Scored ──invalidate──▶ Published
//!     │                        │
//!     └──── rejected ──────────┴──── write refused ────▶ Rejected
//! ```
//!
//! Rejections are outcomes, not errors. `Err` is reserved for collaborator
//! failures after admission (store unavailable, missing rows).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use burgerank_core::constants::RECENT_MATCH_MEMORY;
use burgerank_core::traits::{RankingStore, RatingHistory, StatisticsSource, VenueDirectory};
use burgerank_core::{
    AdmissionError, EloRating, ItemId, MatchRecord, RankError, RankingConfig, RankingScore,
    RatingRecord, RatingSubmission, StoreError, UserId, UserTopFive, ValidationError,
};
use burgerank_elo::{EloEngine, EloUpdate, MatchPair, Winner, default_rating, initial_rating, pick_match_pair, win_probability};
use burgerank_integrity::{CheckContext, CheckMetadata, IntegrityGuard, Verdict};
use burgerank_score::{
    FallbackStatistics, PrecomputedStatistics, RankingDetails, RecomputedStatistics, ScoreCalculator,
    leaderboard,
};
use burgerank_topfive::TopFiveAggregator;

use crate::recompute::recompute_rankings;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionState {
    Submitted,
    Validated,
    Persisted,
    Scored,
    Published,
    Rejected,
}

impl SubmissionState {
    pub fn can_transition_to(self, next: SubmissionState) -> bool {
        use SubmissionState::*;
        matches!(
            (self, next),
            (Submitted, Validated)
                | (Validated, Persisted)
                | (Persisted, Scored)
                | (Scored, Published)
                | (Submitted, Rejected)
                | (Validated, Rejected)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SubmissionState::Published | SubmissionState::Rejected)
    }
}

/// States visited by one submission, in order.
struct Trail(Vec<SubmissionState>);

impl Trail {
    fn start() -> Self {
        Trail(vec![SubmissionState::Submitted])
    }

    fn current(&self) -> SubmissionState {
        self.0.last().copied().unwrap_or(SubmissionState::Submitted)
    }

    fn advance(&mut self, next: SubmissionState, submission: &RatingSubmission) {
        debug_assert!(self.current().can_transition_to(next), "{:?} -> {next:?}", self.current());
        debug!(
            user = %submission.submitter_id,
            item = %submission.item_id,
            from = ?self.current(),
            to = ?next,
            "pipeline: transition"
        );
        self.0.push(next);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    Published {
        record: RatingRecord,
        score: RankingScore,
        metadata: CheckMetadata,
        trail: Vec<SubmissionState>,
    },
    Rejected {
        reason: AdmissionError,
        /// Display text of `reason`.
        message: String,
        trail: Vec<SubmissionState>,
    },
}

impl SubmissionOutcome {
    fn rejected(reason: AdmissionError, trail: Trail) -> Self {
        SubmissionOutcome::Rejected { message: reason.to_string(), reason, trail: trail.0 }
    }

    pub fn state(&self) -> SubmissionState {
        match self {
            SubmissionOutcome::Published { .. } => SubmissionState::Published,
            SubmissionOutcome::Rejected { .. } => SubmissionState::Rejected,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, SubmissionOutcome::Published { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            SubmissionOutcome::Published { .. } => None,
            SubmissionOutcome::Rejected { message, .. } => Some(message),
        }
    }

    pub fn trail(&self) -> &[SubmissionState] {
        match self {
            SubmissionOutcome::Published { trail, .. } | SubmissionOutcome::Rejected { trail, .. } => trail,
        }
    }
}

/// Result of a head-to-head comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    pub record: MatchRecord,
    pub update: EloUpdate,
}

/// A suggested comparison with the current ratings of both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchProposal {
    pub pair: MatchPair,
    pub rating_a: f64,
    pub rating_b: f64,
    /// Chance that `pair.item_a` wins, whole percent.
    pub win_probability_a: u8,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct RankingOrchestrator<S> {
    store: Arc<S>,
    config: RankingConfig,
    guard: IntegrityGuard,
    calculator: ScoreCalculator,
    elo: EloEngine,
    statistics: Box<dyn StatisticsSource>,
    top_five: TopFiveAggregator<S>,
    /// Serializes Elo read-modify-write cycles.
    elo_lock: Mutex<()>,
    /// Held from admission through the rating write.
    admission_lock: Mutex<()>,
}

impl<S> RankingOrchestrator<S>
where
    S: RankingStore + RatingHistory + VenueDirectory + 'static,
{
    /// Wire every component to `store` with the standard admission checks.
    pub fn new(store: Arc<S>, config: RankingConfig) -> Self {
        let guard = IntegrityGuard::standard(store.clone(), store.clone(), &config.integrity);
        let statistics = Box::new(FallbackStatistics::new(
            PrecomputedStatistics::new(store.clone()),
            RecomputedStatistics::new(store.clone(), store.clone(), config.score.recency_window_days),
        ));
        Self {
            top_five: TopFiveAggregator::new(store.clone(), config.top_five.clone()),
            calculator: ScoreCalculator::from_ranking_config(&config),
            elo: EloEngine::from_config(&config.elo),
            guard,
            statistics,
            store,
            config,
            elo_lock: Mutex::new(()),
            admission_lock: Mutex::new(()),
        }
    }

    /// Replace the admission checks.
    pub fn with_guard(mut self, guard: IntegrityGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Run the admission checks alone, without recording anything.
    pub fn check_admission(&self, submission: &RatingSubmission, ctx: &CheckContext) -> Verdict {
        self.guard.check_admission(submission, ctx)
    }

    /// Drive one rating submission through the pipeline.
    ///
    /// Admission and the rating write are serialized per orchestrator, so
    /// concurrent submissions through it cannot both pass the daily limit or
    /// the duplicate window. Scoring runs outside the lock.
    pub fn submit(
        &self,
        submission: &RatingSubmission,
        ctx: &CheckContext,
    ) -> Result<SubmissionOutcome, RankError> {
        let mut trail = Trail::start();

        let admission = self.admission_lock.lock();
        let metadata = match self.guard.check_admission(submission, ctx) {
            Verdict::Allowed(metadata) => metadata,
            Verdict::Rejected(reason) => {
                trail.advance(SubmissionState::Rejected, submission);
                return Ok(SubmissionOutcome::rejected(reason, trail));
            }
        };
        trail.advance(SubmissionState::Validated, submission);

        let (record, written) = match self.store.record_rating(submission) {
            Ok(written) => written,
            Err(StoreError::Conflict(detail)) => {
                trail.advance(SubmissionState::Rejected, submission);
                return Ok(SubmissionOutcome::rejected(AdmissionError::WriteConflict(detail), trail));
            }
            Err(e) => return Err(e.into()),
        };
        drop(admission);
        trail.advance(SubmissionState::Persisted, submission);

        let stats = self.store.item_statistics(&record.item_id, ctx.now)?.unwrap_or(written);
        let mut score = self.calculator.compute(&stats, ctx.now);
        if score.eligible {
            score.rank_position =
                self.store.ranking_score(&score.item_id)?.and_then(|previous| previous.rank_position);
        }
        self.store.store_score(&score)?;
        self.seed_elo(&submission.item_id, submission.score, ctx.now)?;
        trail.advance(SubmissionState::Scored, submission);

        self.top_five.invalidate(&submission.submitter_id);
        trail.advance(SubmissionState::Published, submission);

        info!(
            user = %submission.submitter_id,
            item = %submission.item_id,
            rating_id = record.id,
            composite = score.composite_score,
            eligible = score.eligible,
            "pipeline: rating published"
        );
        Ok(SubmissionOutcome::Published { record, score, metadata, trail: trail.0 })
    }

    /// Create the item's Elo rating from its first stars if it has none.
    fn seed_elo(&self, item: &ItemId, stars: f64, now: DateTime<Utc>) -> Result<(), StoreError> {
        let _guard = self.elo_lock.lock();
        if self.store.elo_rating(item)?.is_none() {
            let rating = EloRating { item_id: item.clone(), rating: initial_rating(stars), updated_at: now };
            debug!(%item, rating = rating.rating, "pipeline: elo seeded");
            self.store.store_elo(&rating)?;
        }
        Ok(())
    }

    fn current_elo(&self, item: &ItemId) -> Result<f64, StoreError> {
        Ok(self.store.elo_rating(item)?.map_or_else(default_rating, |r| r.rating))
    }

    /// Record a head-to-head result and update both Elo ratings.
    pub fn submit_comparison(
        &self,
        user: &UserId,
        item_a: &ItemId,
        item_b: &ItemId,
        winner: &ItemId,
        now: DateTime<Utc>,
    ) -> Result<ComparisonOutcome, RankError> {
        if item_a.is_empty() || item_b.is_empty() {
            return Err(ValidationError::EmptyItemId.into());
        }
        if user.is_empty() {
            return Err(ValidationError::EmptySubmitterId.into());
        }
        if item_a == item_b {
            return Err(ValidationError::SelfComparison(item_a.to_string()).into());
        }
        let side = if winner == item_a {
            Winner::A
        } else if winner == item_b {
            Winner::B
        } else {
            return Err(ValidationError::WinnerNotInMatch(winner.to_string()).into());
        };

        let _guard = self.elo_lock.lock();
        let before_a = self.current_elo(item_a)?;
        let before_b = self.current_elo(item_b)?;
        let update = self.elo.update(before_a, before_b, side);

        self.store.store_elo(&EloRating { item_id: item_a.clone(), rating: update.new_a, updated_at: now })?;
        self.store.store_elo(&EloRating { item_id: item_b.clone(), rating: update.new_b, updated_at: now })?;
        let record = MatchRecord {
            user_id: user.clone(),
            item_a: item_a.clone(),
            item_b: item_b.clone(),
            winner: winner.clone(),
            rating_a_before: before_a,
            rating_b_before: before_b,
            rating_a_after: update.new_a,
            rating_b_after: update.new_b,
            created_at: now,
        };
        self.store.record_match(&record)?;

        info!(%user, a = %item_a, b = %item_b, %winner, delta = update.delta_a.abs(), "pipeline: comparison recorded");
        Ok(ComparisonOutcome { record, update })
    }

    /// Suggest the next comparison for `user` from the items they rated.
    pub fn next_match<R: Rng>(&self, user: &UserId, rng: &mut R) -> Result<Option<MatchProposal>, RankError> {
        let rated: Vec<ItemId> = self.store.ratings_by_user(user)?.into_iter().map(|r| r.item_id).collect();
        let recent = self.store.recent_matches(user, RECENT_MATCH_MEMORY)?;
        let Some(pair) = pick_match_pair(&rated, &recent, rng) else {
            return Ok(None);
        };
        let rating_a = self.current_elo(&pair.item_a)?;
        let rating_b = self.current_elo(&pair.item_b)?;
        Ok(Some(MatchProposal {
            win_probability_a: win_probability(rating_a, rating_b),
            pair,
            rating_a,
            rating_b,
        }))
    }

    /// Flip a rating to verified and re-score its item.
    pub fn mark_verified(&self, rating_id: u64, at: DateTime<Utc>) -> Result<RankingScore, RankError> {
        let record = burgerank_integrity::mark_verified(self.store.as_ref(), rating_id, at)?;
        let stats = self
            .store
            .item_statistics(&record.item_id, at)?
            .ok_or_else(|| StoreError::NotFound(format!("statistics of {}", record.item_id)))?;
        let mut score = self.calculator.compute(&stats, at);
        if score.eligible {
            score.rank_position =
                self.store.ranking_score(&score.item_id)?.and_then(|previous| previous.rank_position);
        }
        self.store.store_score(&score)?;
        Ok(score)
    }

    /// Score an item from whichever statistics source answers.
    pub fn score_item(&self, item: &ItemId, now: DateTime<Utc>) -> Result<Option<RankingScore>, RankError> {
        Ok(self.calculator.score_item(self.statistics.as_ref(), item, now)?)
    }

    pub fn ranking_details(&self, item: &ItemId, now: DateTime<Utc>) -> Result<Option<RankingDetails>, RankError> {
        let Some(stats) = self.statistics.statistics(item, now)? else {
            return Ok(None);
        };
        let mut score = self.calculator.compute(&stats, now);
        if score.eligible {
            score.rank_position = self.store.ranking_score(item)?.and_then(|s| s.rank_position);
        }
        let ratings = self.store.ratings_for_item(item)?;
        Ok(Some(RankingDetails::build(&score, &stats, &ratings, now, self.config.score.recency_window_days)))
    }

    /// The `n` best eligible items among stored scores.
    pub fn leaderboard(&self, n: usize) -> Result<Vec<RankingScore>, RankError> {
        Ok(leaderboard(&self.store.all_scores()?, n))
    }

    pub fn recompute_rankings(&self, now: DateTime<Utc>) -> Result<Vec<RankingScore>, RankError> {
        Ok(recompute_rankings(self.store.as_ref(), &self.calculator, now)?)
    }

    pub fn get_top_five(&self, user: &UserId, now: DateTime<Utc>) -> Result<UserTopFive, RankError> {
        Ok(self.top_five.get_top_five(user, now)?)
    }

    pub fn set_manual_top_five(
        &self,
        user: &UserId,
        items: Vec<ItemId>,
        now: DateTime<Utc>,
    ) -> Result<UserTopFive, RankError> {
        Ok(self.top_five.set_manual_top_five(user, items, now)?)
    }

    pub fn invalidate_top_five(&self, user: &UserId) {
        self.top_five.invalidate(user);
    }

    pub fn clear_manual_top_five(&self, user: &UserId) -> bool {
        self.top_five.clear_manual(user)
    }
}
