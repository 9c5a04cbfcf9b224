//! Outcome of an admission check.

use serde::{Deserialize, Serialize};

use burgerank_core::AdmissionError;

/// Informational extras reported alongside an admission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckMetadata {
    /// Ratings the submitter may still send today, this one included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_today: Option<u32>,
    /// Distance to the venue when the geofence could measure it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl CheckMetadata {
    /// Fill fields missing here from `other`.
    pub fn merge(self, other: CheckMetadata) -> Self {
        Self {
            remaining_today: self.remaining_today.or(other.remaining_today),
            distance_km: self.distance_km.or(other.distance_km),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Verdict {
    Allowed(CheckMetadata),
    Rejected(AdmissionError),
}

impl Verdict {
    pub fn allowed() -> Self {
        Verdict::Allowed(CheckMetadata::default())
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed(_))
    }

    /// Human-readable rejection reason, verbatim for display.
    pub fn reason(&self) -> Option<String> {
        match self {
            Verdict::Allowed(_) => None,
            Verdict::Rejected(e) => Some(e.to_string()),
        }
    }

    pub fn metadata(&self) -> Option<&CheckMetadata> {
        match self {
            Verdict::Allowed(m) => Some(m),
            Verdict::Rejected(_) => None,
        }
    }
}
