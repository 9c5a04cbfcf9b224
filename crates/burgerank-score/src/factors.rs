//! Multiplicative corrections applied on top of the base component.
//!
//! Every factor has an explicit "no data" default of [`NEUTRAL_FACTOR`].
//! When that default is used because an input was missing (as opposed to
//! the rule simply not applying), the returned [`Factor`] names the
//! [`DegradedFactor`] so the caller can record it.
//!
//! | Factor       | Rule                                              | No data |
//! |--------------|---------------------------------------------------|---------|
//! | verification | `1 + verified/total * 0.15`, capped at `1.15`     | total 0 |
//! | novelty      | `1.1` while age <= novelty window                 | n/a     |
//! | variance     | `1.0` sd < 0.5, `0.95` sd <= 1.0, else `0.85`     | sd unknown |
//! | recency      | `1.05` if recent > 30% of total                   | recent unknown |

use chrono::{DateTime, Utc};

use burgerank_core::{DegradedFactor, window_start};
use burgerank_core::constants::{
    NEUTRAL_FACTOR, NOVELTY_BOOST, RECENCY_BOOST, RECENCY_SHARE_THRESHOLD, VARIANCE_LOW_STDDEV,
    VARIANCE_MID_STDDEV, VARIANCE_PENALTY_HIGH, VARIANCE_PENALTY_MID, VERIFICATION_BONUS,
    VERIFICATION_FACTOR_CAP,
};

/// A factor value, plus the reason it is neutral if it had to fall back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Factor {
    pub value: f64,
    pub degraded: Option<DegradedFactor>,
}

impl Factor {
    fn computed(value: f64) -> Self {
        Self { value, degraded: None }
    }

    fn neutral(reason: DegradedFactor) -> Self {
        Self { value: NEUTRAL_FACTOR, degraded: Some(reason) }
    }
}

pub fn verification_factor(verified: u64, total: u64) -> Factor {
    if total == 0 {
        return Factor::neutral(DegradedFactor::Verification);
    }
    let share = (verified.min(total) as f64) / (total as f64);
    Factor::computed((NEUTRAL_FACTOR + share * VERIFICATION_BONUS).min(VERIFICATION_FACTOR_CAP))
}

/// Items created at most `window_days` ago get the novelty boost. A creation
/// time in the future counts as new.
pub fn novelty_boost(created_at: DateTime<Utc>, now: DateTime<Utc>, window_days: i64) -> Factor {
    if created_at >= window_start(now, window_days) {
        Factor::computed(NOVELTY_BOOST)
    } else {
        Factor::computed(NEUTRAL_FACTOR)
    }
}

pub fn variance_penalty(std_deviation: Option<f64>) -> Factor {
    match std_deviation {
        Some(sd) if sd.is_finite() && sd >= 0.0 => {
            if sd < VARIANCE_LOW_STDDEV {
                Factor::computed(NEUTRAL_FACTOR)
            } else if sd <= VARIANCE_MID_STDDEV {
                Factor::computed(VARIANCE_PENALTY_MID)
            } else {
                Factor::computed(VARIANCE_PENALTY_HIGH)
            }
        }
        _ => Factor::neutral(DegradedFactor::Variance),
    }
}

pub fn recency_factor(recent: Option<u64>, total: u64) -> Factor {
    let Some(recent) = recent else {
        return Factor::neutral(DegradedFactor::Recency);
    };
    if total == 0 {
        return Factor::neutral(DegradedFactor::Recency);
    }
    if recent as f64 > RECENCY_SHARE_THRESHOLD * total as f64 {
        Factor::computed(RECENCY_BOOST)
    } else {
        Factor::computed(NEUTRAL_FACTOR)
    }
}
