//! Domain model for customers and vouchers.
//!
//! # Responsibility
//! - Define canonical records used by repositories and services.
//! - Keep lifecycle helpers (block, assign, use) next to the data they touch.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - Deletion removes a record; there is no tombstone state.
//! - Timestamps are local wall-clock values without a zone offset.
//! - Persisted timestamps have a four-digit year, so their fixed-width text
//!   form sorts in time order.

use chrono::{Datelike, Local, NaiveDateTime};

pub mod customer;
pub mod voucher;

const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Returns the current local wall-clock time used for `created_at` defaults
/// and expiry checks.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Returns whether `value` has a year in `0..=9999`.
pub fn is_storable_timestamp(value: NaiveDateTime) -> bool {
    STORABLE_YEARS.contains(&value.year())
}
