//! Voucher domain model.
//!
//! # Responsibility
//! - Define the voucher record and its discount kind.
//! - Provide ownership and usage helpers.
//!
//! # Invariants
//! - Vouchers built through `new`/`with_id` have a positive `amount`, percent
//!   vouchers never exceed 100, `expired_at` is not earlier than `created_at`,
//!   and both timestamps have a four-digit year.
//! - `from_parts` skips those checks so stored data can always be read back;
//!   repositories re-check them on every write.
//! - `owner_id = None` means the voucher is unassigned.

use super::customer::CustomerId;
use super::{is_storable_timestamp, now};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type VoucherId = Uuid;

const MAX_PERCENT: i64 = 100;

/// Discount kind, persisted as the voucher type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherKind {
    /// `amount` is a percentage off.
    Percent,
    /// `amount` is a fixed value off.
    Fixed,
}

impl VoucherKind {
    /// Returns the stable tag used in storage and flat lines.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Percent => "PERCENT",
            Self::Fixed => "FIXED",
        }
    }
}

impl Display for VoucherKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Validation failures for voucher field combinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoucherValidationError {
    NonPositiveAmount(i64),
    PercentOutOfRange(i64),
    ExpiryBeforeCreation {
        created_at: NaiveDateTime,
        expired_at: NaiveDateTime,
    },
    /// Timestamp year is outside `0..=9999` and cannot be stored in order.
    TimestampOutOfRange {
        field: &'static str,
        value: NaiveDateTime,
    },
}

impl Display for VoucherValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "voucher amount must be positive, got {amount}")
            }
            Self::PercentOutOfRange(amount) => write!(
                f,
                "percent voucher amount must be <= {MAX_PERCENT}, got {amount}"
            ),
            Self::ExpiryBeforeCreation {
                created_at,
                expired_at,
            } => write!(
                f,
                "expired_at ({expired_at}) must be >= created_at ({created_at})"
            ),
            Self::TimestampOutOfRange { field, value } => {
                write!(f, "{field} ({value}) is outside years 0000..=9999")
            }
        }
    }
}

impl Error for VoucherValidationError {}

/// Voucher record as stored and returned by repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    pub voucher_id: VoucherId,
    pub owner_id: Option<CustomerId>,
    pub amount: i64,
    /// Serialized as `type` to match the storage column.
    #[serde(rename = "type")]
    pub kind: VoucherKind,
    pub created_at: NaiveDateTime,
    pub expired_at: NaiveDateTime,
    pub used: bool,
}

impl Voucher {
    /// Creates an unassigned, unused voucher with a generated id.
    ///
    /// # Errors
    /// - Returns a validation error when `amount` or `expired_at` is invalid.
    pub fn new(
        kind: VoucherKind,
        amount: i64,
        expired_at: NaiveDateTime,
    ) -> Result<Self, VoucherValidationError> {
        Self::with_id(Uuid::new_v4(), None, kind, amount, now(), expired_at, false)
    }

    /// Creates a validated voucher with every field provided by the caller.
    pub fn with_id(
        voucher_id: VoucherId,
        owner_id: Option<CustomerId>,
        kind: VoucherKind,
        amount: i64,
        created_at: NaiveDateTime,
        expired_at: NaiveDateTime,
        used: bool,
    ) -> Result<Self, VoucherValidationError> {
        let voucher = Self::from_parts(
            voucher_id, owner_id, kind, amount, created_at, expired_at, used,
        );
        voucher.validate()?;
        Ok(voucher)
    }

    /// Assembles a voucher without checking field invariants.
    ///
    /// Used by the decoders: a stored or imported record is returned as is.
    pub fn from_parts(
        voucher_id: VoucherId,
        owner_id: Option<CustomerId>,
        kind: VoucherKind,
        amount: i64,
        created_at: NaiveDateTime,
        expired_at: NaiveDateTime,
        used: bool,
    ) -> Self {
        Self {
            voucher_id,
            owner_id,
            amount,
            kind,
            created_at,
            expired_at,
            used,
        }
    }

    /// Checks field invariants.
    pub fn validate(&self) -> Result<(), VoucherValidationError> {
        if self.amount <= 0 {
            return Err(VoucherValidationError::NonPositiveAmount(self.amount));
        }
        if self.kind == VoucherKind::Percent && self.amount > MAX_PERCENT {
            return Err(VoucherValidationError::PercentOutOfRange(self.amount));
        }
        for (field, value) in [("created_at", self.created_at), ("expired_at", self.expired_at)] {
            if !is_storable_timestamp(value) {
                return Err(VoucherValidationError::TimestampOutOfRange { field, value });
            }
        }
        if self.expired_at < self.created_at {
            return Err(VoucherValidationError::ExpiryBeforeCreation {
                created_at: self.created_at,
                expired_at: self.expired_at,
            });
        }
        Ok(())
    }

    pub fn assign_to(&mut self, owner_id: CustomerId) {
        self.owner_id = Some(owner_id);
    }

    pub fn unassign(&mut self) {
        self.owner_id = None;
    }

    pub fn is_assigned(&self) -> bool {
        self.owner_id.is_some()
    }

    pub fn mark_used(&mut self) {
        self.used = true;
    }

    /// Returns whether the voucher expired strictly before `at`.
    pub fn is_expired_at(&self, at: NaiveDateTime) -> bool {
        self.expired_at < at
    }
}
