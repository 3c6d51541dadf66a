//! Read-time urgency classification
//!
//! Computed per request for kitchen displays, never persisted.

use chrono::{DateTime, Utc};

/// An order becomes urgent once it has been waiting strictly longer
/// than this many minutes.
pub const URGENT_AFTER_MINUTES: i64 = 15;

/// Whole minutes elapsed since `created_at` (clock skew clamps to 0)
pub fn elapsed_minutes(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created_at).num_minutes().max(0)
}

/// Exclusive boundary: exactly 15 minutes is not yet urgent
pub fn is_urgent(elapsed_minutes: i64) -> bool {
    elapsed_minutes > URGENT_AFTER_MINUTES
}
