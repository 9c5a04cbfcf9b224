//! Verification marking.
//!
//! Runs after a photo or receipt check succeeds, outside the admission
//! path. It only feeds the verification factor of future scores.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use burgerank_core::traits::RankingStore;
use burgerank_core::{RatingRecord, StoreError};

/// Flip rating `rating_id` to verified.
pub fn mark_verified<S: RankingStore + ?Sized>(
    store: &S,
    rating_id: u64,
    at: DateTime<Utc>,
) -> Result<RatingRecord, StoreError> {
    match store.mark_verified(rating_id, at) {
        Ok(record) => {
            info!(rating_id, item = %record.item_id, "integrity: rating marked verified");
            Ok(record)
        }
        Err(e) => {
            warn!(rating_id, error = %e, "integrity: verification marking failed");
            Err(e)
        }
    }
}
