//! End-to-end tests for the BurgeRank pipeline.
//!
//! Every test drives a [`RankingOrchestrator`] over the in-memory store the
//! way a host service would: admission, persistence, scoring, publication,
//! then reads (leaderboard, details, top five, comparisons).

use std::io::Write;
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use burgerank_core::traits::{RankingStore, RatingHistory, VenueDirectory};
use burgerank_core::{
    EloRating, ItemId, ItemStatistics, MatchRecord, RankError, RankingConfig, RankingScore,
    RatingRecord, RatingSubmission, StoreError, TopFiveError, UserId, Venue,
};
use burgerank_elo::{EloEngine, Winner, expected_score, initial_rating};
use burgerank_node::{MemoryStore, RankingOrchestrator, SubmissionOutcome, SubmissionState};
use burgerank_tests::helpers::*;

fn published(outcome: &SubmissionOutcome) -> (&RatingRecord, &RankingScore) {
    match outcome {
        SubmissionOutcome::Published { record, score, .. } => (record, score),
        SubmissionOutcome::Rejected { message, .. } => panic!("unexpected rejection: {message}"),
    }
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

// ======================================================================
// Daily quota follows the submitter's local midnight
// ======================================================================

#[test]
fn e2e_daily_limit_resets_at_local_midnight() {
    let orch = orchestrator_with(&["b1", "b2", "b3", "b4"], RankingConfig::default());
    let day = t0().date_naive().and_hms_opt(0, 0, 0).unwrap().and_utc();

    for (hour, item, remaining) in [(8, "b1", 3), (9, "b2", 2), (10, "b3", 1)] {
        let at = day + Duration::hours(hour);
        let outcome = orch.submit(&on_site("ana", item, 4.0, at), &context(at, cest())).unwrap();
        let SubmissionOutcome::Published { metadata, .. } = outcome else {
            panic!("rating {item} should publish");
        };
        assert_eq!(metadata.remaining_today, Some(remaining));
    }

    let fourth = day + Duration::hours(11);
    let outcome = orch.submit(&on_site("ana", "b4", 4.0, fourth), &context(fourth, cest())).unwrap();
    assert_eq!(outcome.reason(), Some("Has alcanzado el límite de 3 valoraciones por día"));

    // 22:30 UTC is still June 10 in UTC but already June 11 in Madrid.
    let late = day + Duration::hours(22) + Duration::minutes(30);
    let as_utc = orch.submit(&on_site("ana", "b4", 4.0, late), &context(late, utc())).unwrap();
    assert_eq!(as_utc.state(), SubmissionState::Rejected);

    let as_madrid = orch.submit(&on_site("ana", "b4", 4.0, late), &context(late, cest())).unwrap();
    assert!(as_madrid.is_published());
    assert_eq!(orch.store().rating_count(), 4);
}

// ======================================================================
// Duplicate suppression window
// ======================================================================

#[test]
fn e2e_duplicate_window() {
    let orch = orchestrator_with(&["b1"], RankingConfig::default());
    let start = t0();
    assert!(orch.submit(&on_site("ana", "b1", 4.0, start), &context(start, cest())).unwrap().is_published());

    let three_days = start + Duration::days(3);
    let again = orch.submit(&on_site("ana", "b1", 5.0, three_days), &context(three_days, cest())).unwrap();
    assert_eq!(again.reason(), Some("Ya has valorado esta burger recientemente. Intenta en 7 días"));

    // another user is unaffected
    assert!(orch.submit(&on_site("bob", "b1", 5.0, three_days), &context(three_days, cest())).unwrap().is_published());

    let eight_days = start + Duration::days(8);
    assert!(orch.submit(&on_site("ana", "b1", 5.0, eight_days), &context(eight_days, cest())).unwrap().is_published());
    assert_eq!(orch.store().ratings_for_item(&ItemId::new("b1")).unwrap().len(), 3);
}

// ======================================================================
// Geofence: near allowed, far rejected, missing data fails open
// ======================================================================

#[test]
fn e2e_geofence() {
    let orch = orchestrator_with(&["b1"], RankingConfig::default());
    orch.store().add_venue(Venue { item_id: ItemId::new("popup"), location: None, created_at: t0() });
    let now = t0();

    let mut near = on_site("ana", "b1", 4.0, now);
    near.location = Some(north_of(MADRID, 0.5));
    let SubmissionOutcome::Published { metadata, .. } = orch.submit(&near, &context(now, cest())).unwrap() else {
        panic!("0.5 km away should publish");
    };
    assert!((metadata.distance_km.unwrap() - 0.5).abs() < 0.01);

    let mut far = on_site("bob", "b1", 4.0, now);
    far.location = Some(BARCELONA);
    let outcome = orch.submit(&far, &context(now, cest())).unwrap();
    assert_eq!(outcome.reason(), Some("Debes estar dentro de 5km del restaurante para valorar"));
    assert_eq!(outcome.trail(), &[SubmissionState::Submitted, SubmissionState::Rejected]);

    let mut no_coords = on_site("carla", "popup", 4.0, now);
    no_coords.location = Some(BARCELONA);
    assert!(orch.submit(&no_coords, &context(now, cest())).unwrap().is_published());

    let mut unknown = on_site("dani", "ghost", 4.0, now);
    unknown.location = Some(BARCELONA);
    assert!(orch.submit(&unknown, &context(now, cest())).unwrap().is_published());

    let mut no_location = on_site("eva", "b1", 4.0, now);
    no_location.location = None;
    assert!(orch.submit(&no_location, &context(now, cest())).unwrap().is_published());

    assert_eq!(orch.store().rating_count(), 4);
}

// ======================================================================
// Full lifecycle: ratings, recompute, leaderboard, details, verification
// ======================================================================

#[test]
fn e2e_ranking_lifecycle() {
    let items = ["classic", "smash", "vegan", "newcomer"];
    let orch = orchestrator_with(&items, RankingConfig::default());
    let mut smash_ratings = Vec::new();

    for i in 0..10i64 {
        let user = format!("u{i}");
        let mut plan = vec![(3, "classic", 5.0), (2, "smash", 4.0)];
        if i < 6 {
            plan.push((1, "vegan", 3.0));
        }
        if i < 2 {
            plan.push((0, "newcomer", 5.0));
        }
        for (days_ago, item, stars) in plan {
            let at = t0() - Duration::days(days_ago) - Duration::hours(2) + Duration::minutes(i);
            let outcome = orch.submit(&on_site(&user, item, stars, at), &context(at, cest())).unwrap();
            let (record, _) = published(&outcome);
            if item == "smash" {
                smash_ratings.push(record.id);
            }
        }
    }

    let ranked = orch.recompute_rankings(t0()).unwrap();
    assert_eq!(ranked.len(), 4);

    let board = orch.leaderboard(5).unwrap();
    let names: Vec<(&str, Option<u32>)> = board.iter().map(|s| (s.item_id.as_str(), s.rank_position)).collect();
    assert_eq!(names, vec![("classic", Some(1)), ("smash", Some(2)), ("vegan", Some(3))]);

    // (10*3.5 + 10*5) / 20 = 4.25, every rating recent: * 1.05
    assert!((board[0].composite_score - 4.4625).abs() < 1e-9);
    assert!((board[0].bayesian_score - 4.25).abs() < 1e-9);
    assert_eq!(board[0].factors.recency, 1.05);

    let newcomer = orch.store().ranking_score(&ItemId::new("newcomer")).unwrap().unwrap();
    assert!(!newcomer.eligible);
    assert_eq!(newcomer.rank_position, None);

    let details = orch.ranking_details(&ItemId::new("classic"), t0()).unwrap().unwrap();
    assert_eq!(details.rank_position, Some(1));
    assert_eq!(details.distribution.five, 10);
    assert_eq!(details.verified_percentage, 0);
    assert_eq!(details.recent_count, 10);

    let before = orch.store().ranking_score(&ItemId::new("smash")).unwrap().unwrap();
    for id in &smash_ratings[..5] {
        orch.mark_verified(*id, t0()).unwrap();
    }
    let after = orch.store().ranking_score(&ItemId::new("smash")).unwrap().unwrap();
    assert!((after.factors.verification - 1.075).abs() < 1e-12);
    assert!(after.composite_score > before.composite_score);
    assert_eq!(after.rank_position, Some(2), "verification keeps the stored position");

    let details = orch.ranking_details(&ItemId::new("smash"), t0()).unwrap().unwrap();
    assert_eq!(details.verified_percentage, 50);
}

#[test]
fn e2e_scores_age_with_the_clock() {
    let orch = orchestrator_with(&["b1"], RankingConfig::default());
    let rated = t0() - Duration::days(90);
    for i in 0..6i64 {
        let at = rated + Duration::minutes(i);
        let outcome = orch.submit(&on_site(&format!("u{i}"), "b1", 4.5, at), &context(at, cest())).unwrap();
        assert!(outcome.is_published());
    }
    let item = ItemId::new("b1");

    // right after the ratings every one of them is recent
    let fresh = orch.store().ranking_score(&item).unwrap().unwrap();
    assert_eq!(fresh.factors.recency, 1.05);

    let ranked = orch.recompute_rankings(t0()).unwrap();
    assert_eq!(ranked[0].factors.recency, 1.0);
    assert_eq!(orch.store().ranking_score(&item).unwrap().unwrap().factors.recency, 1.0);

    assert_eq!(orch.score_item(&item, t0()).unwrap().unwrap().factors.recency, 1.0);

    let details = orch.ranking_details(&item, t0()).unwrap().unwrap();
    assert_eq!(details.recent_count, 0);
    assert_eq!(details.factors.recency, 1.0);
}

#[test]
fn e2e_verifying_unknown_rating_is_store_error() {
    let orch = orchestrator_with(&[], RankingConfig::default());
    assert!(matches!(orch.mark_verified(42, t0()), Err(RankError::Store(StoreError::NotFound(_)))));
}

// ======================================================================
// Personal top five
// ======================================================================

#[test]
fn e2e_top_five_manual_and_auto() {
    let orch = orchestrator_with(&["b1", "b2", "b3", "b4"], RankingConfig::default());
    let ana = UserId::new("ana");
    fn ids(names: &[&str]) -> Vec<ItemId> {
        names.iter().map(|n| ItemId::new(*n)).collect()
    }

    assert!(orch.get_top_five(&ana, t0()).unwrap().items.is_empty());

    for (days_ago, item, stars) in [(3, "b1", 3.0), (2, "b2", 5.0), (1, "b3", 4.0)] {
        let at = t0() - Duration::days(days_ago);
        orch.submit(&on_site("ana", item, stars, at), &context(at, cest())).unwrap();
    }
    let auto = orch.get_top_five(&ana, t0()).unwrap();
    assert_eq!(auto.items, ids(&["b2", "b3", "b1"]));
    assert!(!auto.is_manual);

    for bad in [ids(&["a", "b", "c", "d"]), ids(&["a", "b", "c", "d", "e", "f"])] {
        assert!(matches!(
            orch.set_manual_top_five(&ana, bad, t0()),
            Err(RankError::TopFive(TopFiveError::WrongLength { .. }))
        ));
    }
    assert!(matches!(
        orch.set_manual_top_five(&ana, ids(&["a", "b", "c", "a", "e"]), t0()),
        Err(RankError::TopFive(TopFiveError::DuplicateItem(_)))
    ));

    let pinned = ids(&["b4", "b3", "x", "y", "b1"]);
    orch.set_manual_top_five(&ana, pinned.clone(), t0()).unwrap();
    let read = orch.get_top_five(&ana, t0() + Duration::minutes(30)).unwrap();
    assert_eq!(read.items, pinned);
    assert!(read.is_manual);

    // a new rating invalidates, which drops the manual pin
    let at = t0() + Duration::hours(1);
    orch.submit(&on_site("ana", "b4", 5.0, at), &context(at, cest())).unwrap();
    let fresh = orch.get_top_five(&ana, at).unwrap();
    assert!(!fresh.is_manual);
    assert_eq!(fresh.items, ids(&["b4", "b2", "b3", "b1"]));
}

// ======================================================================
// Head-to-head comparisons
// ======================================================================

#[test]
fn e2e_elo_reference_example() {
    let update = EloEngine::default().update(1500.0, 1500.0, Winner::A);
    assert_eq!(expected_score(1500.0, 1500.0), 0.5);
    assert_eq!((update.delta_a, update.new_a, update.new_b), (16.0, 1516.0, 1484.0));
}

#[test]
fn e2e_comparisons_between_rated_items() {
    let orch = orchestrator_with(&["classic", "vegan"], RankingConfig::default());
    let ana = UserId::new("ana");
    let (classic, vegan) = (ItemId::new("classic"), ItemId::new("vegan"));

    let at = t0() - Duration::hours(1);
    orch.submit(&on_site("ana", "classic", 5.0, at), &context(at, cest())).unwrap();
    orch.submit(&on_site("ana", "vegan", 1.0, at), &context(at, cest())).unwrap();
    assert_eq!(orch.store().elo_rating(&classic).unwrap().unwrap().rating, initial_rating(5.0));
    assert_eq!(orch.store().elo_rating(&vegan).unwrap().unwrap().rating, 1280.0);

    let mut rng = StdRng::seed_from_u64(3);
    let proposal = orch.next_match(&ana, &mut rng).unwrap().unwrap();
    let mut pair = [proposal.pair.item_a.clone(), proposal.pair.item_b.clone()];
    pair.sort();
    assert_eq!(pair, [classic.clone(), vegan.clone()]);

    // upset: the 1280 item beats the 1600 one
    let out = orch.submit_comparison(&ana, &classic, &vegan, &vegan, t0()).unwrap();
    let expected_gain = 32.0 * (1.0 - expected_score(1280.0, 1600.0));
    assert!((out.update.delta_b - expected_gain).abs() < 1e-9);
    assert_eq!(out.update.delta_a, -out.update.delta_b);

    let sum = orch.store().elo_rating(&classic).unwrap().unwrap().rating
        + orch.store().elo_rating(&vegan).unwrap().unwrap().rating;
    assert!((sum - 2880.0).abs() < 1e-9);
    assert_eq!(orch.store().recent_matches(&ana, 20).unwrap().len(), 1);
}

// ======================================================================
// Statistics fallback: precomputed rows unavailable
// ======================================================================

/// Delegates to a [`MemoryStore`] but refuses to serve precomputed statistics.
struct NoPrecomputed(MemoryStore);

impl RatingHistory for NoPrecomputed {
    fn ratings_by_user(&self, user: &UserId) -> Result<Vec<RatingRecord>, StoreError> {
        self.0.ratings_by_user(user)
    }
    fn ratings_for_item(&self, item: &ItemId) -> Result<Vec<RatingRecord>, StoreError> {
        self.0.ratings_for_item(item)
    }
    fn recent_matches(&self, user: &UserId, limit: usize) -> Result<Vec<MatchRecord>, StoreError> {
        self.0.recent_matches(user, limit)
    }
}

impl VenueDirectory for NoPrecomputed {
    fn venue(&self, item: &ItemId) -> Result<Option<Venue>, StoreError> {
        self.0.venue(item)
    }
}

impl RankingStore for NoPrecomputed {
    fn record_rating(&self, s: &RatingSubmission) -> Result<(RatingRecord, ItemStatistics), StoreError> {
        self.0.record_rating(s)
    }
    fn mark_verified(&self, id: u64, at: DateTime<Utc>) -> Result<RatingRecord, StoreError> {
        self.0.mark_verified(id, at)
    }
    fn item_statistics(&self, _item: &ItemId, _now: DateTime<Utc>) -> Result<Option<ItemStatistics>, StoreError> {
        Err(StoreError::Unavailable("statistics function missing".into()))
    }
    fn statistics_snapshot(&self, now: DateTime<Utc>) -> Result<Vec<ItemStatistics>, StoreError> {
        self.0.statistics_snapshot(now)
    }
    fn store_score(&self, score: &RankingScore) -> Result<(), StoreError> {
        self.0.store_score(score)
    }
    fn ranking_score(&self, item: &ItemId) -> Result<Option<RankingScore>, StoreError> {
        self.0.ranking_score(item)
    }
    fn all_scores(&self) -> Result<Vec<RankingScore>, StoreError> {
        self.0.all_scores()
    }
    fn elo_rating(&self, item: &ItemId) -> Result<Option<EloRating>, StoreError> {
        self.0.elo_rating(item)
    }
    fn store_elo(&self, rating: &EloRating) -> Result<(), StoreError> {
        self.0.store_elo(rating)
    }
    fn record_match(&self, record: &MatchRecord) -> Result<(), StoreError> {
        self.0.record_match(record)
    }
}

#[test]
fn e2e_fallback_statistics_match_primary() {
    let primary = orchestrator_with(&["b1"], RankingConfig::default());
    let store = MemoryStore::new();
    store.add_venue(madrid_venue("b1"));
    let degraded = RankingOrchestrator::new(Arc::new(NoPrecomputed(store)), RankingConfig::default());

    for (i, stars) in [5.0, 4.5, 3.0, 4.0, 5.0, 2.5].into_iter().enumerate() {
        let at = t0() - Duration::minutes(60 - i as i64);
        let s = on_site(&format!("u{i}"), "b1", stars, at);
        primary.submit(&s, &context(at, cest())).unwrap();
        degraded.submit(&s, &context(at, cest())).unwrap();
    }

    let item = ItemId::new("b1");
    let a = primary.score_item(&item, t0()).unwrap().unwrap();
    let b = degraded.score_item(&item, t0()).unwrap().unwrap();
    assert_eq!(a, b);
    assert!(a.eligible);
    assert_eq!(a.factors.recency, 1.05);

    let later = t0() + Duration::days(40);
    let a = primary.score_item(&item, later).unwrap().unwrap();
    let b = degraded.score_item(&item, later).unwrap().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.factors.recency, 1.0);
    assert!(degraded.score_item(&ItemId::new("ghost"), t0()).unwrap().is_none());
}

// ======================================================================
// Concurrency: no lost statistics updates, recompute alongside writes
// ======================================================================

#[test]
fn e2e_concurrent_submissions_and_recompute() {
    let orch = Arc::new(orchestrator_with(&["hot", "side-0", "side-1"], RankingConfig::default()));
    let now = t0();

    let recomputer = {
        let orch = orch.clone();
        thread::spawn(move || {
            for _ in 0..20 {
                orch.recompute_rankings(now).unwrap();
            }
        })
    };
    let writers: Vec<_> = (0..16)
        .map(|t| {
            let orch = orch.clone();
            thread::spawn(move || {
                let user = format!("w{t}");
                for item in ["hot", "side-0", "side-1"] {
                    let at = now - Duration::seconds(t);
                    let outcome = orch.submit(&on_site(&user, item, 4.5, at), &context(now, cest())).unwrap();
                    assert!(outcome.is_published());
                }
            })
        })
        .collect();
    for w in writers {
        w.join().unwrap();
    }
    recomputer.join().unwrap();

    let stats = orch.store().item_statistics(&ItemId::new("hot"), now).unwrap().unwrap();
    assert_eq!(stats.total_rating_count, 16);

    let ranked = orch.recompute_rankings(now).unwrap();
    assert!(ranked.iter().all(|s| s.total_rating_count == 16 && s.rank_position.is_some()));
}

// ======================================================================
// Configuration file drives the gate
// ======================================================================

#[test]
fn e2e_config_file_tightens_daily_limit() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[integrity]\ndaily_limit = 1\ngeofence_enabled = false").unwrap();
    let config = RankingConfig::load(Some(file.path())).unwrap();

    let orch = orchestrator_with(&["b1", "b2"], config);
    let now = t0();
    let mut far = on_site("ana", "b1", 4.0, now);
    far.location = Some(BARCELONA);
    assert!(orch.submit(&far, &context(now, cest())).unwrap().is_published());

    let second = orch.submit(&on_site("ana", "b2", 4.0, now), &context(now, cest())).unwrap();
    assert_eq!(second.reason(), Some("Has alcanzado el límite de 1 valoraciones por día"));
}

#[test]
fn e2e_outcomes_serialize_for_transport() {
    let orch = orchestrator_with(&["b1"], RankingConfig::default());
    let now = t0();
    let outcome = orch.submit(&on_site("ana", "b1", 4.5, now), &context(now, cest())).unwrap();

    let json = serde_json::to_string(&outcome).unwrap();
    let back: SubmissionOutcome = serde_json::from_str(&json).unwrap();
    assert_eq!(back, outcome);
}
