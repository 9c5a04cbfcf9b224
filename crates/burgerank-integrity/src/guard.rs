//! The composite admission gate.

use std::sync::Arc;

use tracing::debug;

use burgerank_core::config::IntegrityConfig;
use burgerank_core::traits::{RatingHistory, VenueDirectory};
use burgerank_core::{AdmissionError, RatingSubmission};

use crate::checks::{AdmissionCheck, CheckContext, standard_checks};
use crate::verdict::{CheckMetadata, Verdict};

/// Runs a submission through shape validation and then every check in
/// order, stopping at the first rejection.
#[derive(Default)]
pub struct IntegrityGuard {
    checks: Vec<Box<dyn AdmissionCheck>>,
}

impl IntegrityGuard {
    /// A guard with no checks: only shape validation applies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Daily limit, duplicate suppression and (if enabled) geofence.
    pub fn standard<H, V>(history: Arc<H>, venues: Arc<V>, config: &IntegrityConfig) -> Self
    where
        H: RatingHistory + ?Sized + 'static,
        V: VenueDirectory + ?Sized + 'static,
    {
        Self { checks: standard_checks(history, venues, config) }
    }

    pub fn with_check(mut self, check: impl AdmissionCheck + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Decide whether `submission` may be accepted.
    ///
    /// A malformed submission is rejected before any check runs. On success
    /// the metadata of every check is merged.
    pub fn check_admission(&self, submission: &RatingSubmission, ctx: &CheckContext) -> Verdict {
        if let Err(e) = submission.validate(ctx.now) {
            debug!(user = %submission.submitter_id, error = %e, "integrity: malformed submission");
            return Verdict::Rejected(AdmissionError::Malformed(e.to_string()));
        }

        let mut metadata = CheckMetadata::default();
        for check in &self.checks {
            match check.check(submission, ctx) {
                Verdict::Allowed(m) => metadata = metadata.merge(m),
                rejected @ Verdict::Rejected(_) => {
                    debug!(
                        check = check.name(),
                        user = %submission.submitter_id,
                        item = %submission.item_id,
                        reason = ?rejected.reason(),
                        "integrity: submission rejected"
                    );
                    return rejected;
                }
            }
        }
        Verdict::Allowed(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use parking_lot::Mutex;

    use burgerank_core::{GeoPoint, ItemId, UserId};

    /// Records its invocations and answers with a fixed verdict.
    struct Scripted {
        name: &'static str,
        verdict: Verdict,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl AdmissionCheck for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }
        fn check(&self, _: &RatingSubmission, _: &CheckContext) -> Verdict {
            self.calls.lock().push(self.name);
            self.verdict.clone()
        }
    }

    fn submission(now: DateTime<Utc>) -> RatingSubmission {
        RatingSubmission {
            item_id: ItemId::new("b"),
            submitter_id: UserId::new("ana"),
            score: 4.0,
            has_photo: true,
            has_receipt: false,
            submitted_at: now,
            location: Some(GeoPoint::new(40.0, -3.0)),
        }
    }

    fn ctx(now: DateTime<Utc>) -> CheckContext {
        CheckContext::new(now, now - Duration::hours(3))
    }

    #[test]
    fn first_rejection_short_circuits() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let guard = IntegrityGuard::new()
            .with_check(Scripted { name: "one", verdict: Verdict::allowed(), calls: calls.clone() })
            .with_check(Scripted {
                name: "two",
                verdict: Verdict::Rejected(AdmissionError::RateLimitExceeded { limit: 3 }),
                calls: calls.clone(),
            })
            .with_check(Scripted { name: "three", verdict: Verdict::allowed(), calls: calls.clone() });

        let now = Utc::now();
        let v = guard.check_admission(&submission(now), &ctx(now));
        assert_eq!(v.reason().as_deref(), Some("Has alcanzado el límite de 3 valoraciones por día"));
        assert_eq!(*calls.lock(), vec!["one", "two"]);
    }

    #[test]
    fn metadata_from_all_checks_is_merged() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let guard = IntegrityGuard::new()
            .with_check(Scripted {
                name: "quota",
                verdict: Verdict::Allowed(CheckMetadata { remaining_today: Some(2), distance_km: None }),
                calls: calls.clone(),
            })
            .with_check(Scripted {
                name: "geo",
                verdict: Verdict::Allowed(CheckMetadata { remaining_today: None, distance_km: Some(1.2) }),
                calls,
            });

        let now = Utc::now();
        let v = guard.check_admission(&submission(now), &ctx(now));
        assert_eq!(v, Verdict::Allowed(CheckMetadata { remaining_today: Some(2), distance_km: Some(1.2) }));
        assert_eq!(guard.check_names(), vec!["quota", "geo"]);
    }

    #[test]
    fn malformed_submission_never_reaches_checks() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let guard = IntegrityGuard::new()
            .with_check(Scripted { name: "one", verdict: Verdict::allowed(), calls: calls.clone() });

        let now = Utc::now();
        let mut s = submission(now);
        s.score = 7.0;
        let v = guard.check_admission(&s, &ctx(now));
        assert!(matches!(v, Verdict::Rejected(AdmissionError::Malformed(_))));
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn empty_guard_admits_valid_submission() {
        let now = Utc::now();
        assert!(IntegrityGuard::new().check_admission(&submission(now), &ctx(now)).is_allowed());
    }
}
