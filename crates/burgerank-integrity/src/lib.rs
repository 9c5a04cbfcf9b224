//! # burgerank-integrity — Admission gate for rating submissions.
//!
//! A submission is admitted only when its shape is valid and every
//! configured [`AdmissionCheck`] allows it. Checks read history through the
//! core collaborator traits and never write; rejection is a [`Verdict`]
//! value carrying a user-facing reason, not an error.
//!
//! Checks shipped here:
//! - [`DailyLimitCheck`]: accepted ratings since the submitter's local midnight
//! - [`DuplicateCheck`]: same user and item inside the trailing window
//! - [`GeofenceCheck`]: haversine distance to the venue, fails open on
//!   missing data
//!
//! [`mark_verified`] is the non-gating verification path.

pub mod checks;
pub mod geo;
pub mod guard;
pub mod verdict;
pub mod verification;

pub use checks::{AdmissionCheck, CheckContext, DailyLimitCheck, DuplicateCheck, GeofenceCheck};
pub use geo::{haversine_km, local_day_start};
pub use guard::IntegrityGuard;
pub use verdict::{CheckMetadata, Verdict};
pub use verification::mark_verified;
