//! Voucher use-case service.
//!
//! # Responsibility
//! - Build vouchers from textual create requests.
//! - Provide lookup, assignment and usage entry points.
//!
//! # Invariants
//! - Every mutation goes through `VoucherRepository::update`, so the stored
//!   `created_at` never changes.

use super::{ServiceError, ServiceResult};
use crate::codec::{parse_owner_id, parse_voucher_kind};
use crate::model::customer::CustomerId;
use crate::model::now;
use crate::model::voucher::{Voucher, VoucherId};
use crate::repo::voucher_repo::VoucherRepository;
use chrono::NaiveDateTime;

/// Request model for creating a voucher from presentation-layer input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateVoucherRequest {
    /// Owner id text; empty or `null` creates an unassigned voucher.
    pub owner_id: String,
    pub amount: i64,
    /// Type tag, `PERCENT` or `FIXED`.
    pub kind: String,
    pub expired_at: NaiveDateTime,
}

/// Use-case service wrapper for voucher operations.
pub struct VoucherService<R: VoucherRepository> {
    repo: R,
}

impl<R: VoucherRepository> VoucherService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates a voucher with a generated id and `created_at = now`.
    ///
    /// # Errors
    /// - `InvalidRequest` for an unknown type tag or unparsable owner id.
    /// - `Validation` for an invalid amount or an expiry in the past.
    pub fn create_voucher(&self, request: &CreateVoucherRequest) -> ServiceResult<Voucher> {
        let kind = parse_voucher_kind(request.kind.trim())?;
        let owner_id = match request.owner_id.trim() {
            "" => None,
            owner_id => parse_owner_id(owner_id)?,
        };

        let mut voucher = Voucher::new(kind, request.amount, request.expired_at)?;
        if let Some(owner_id) = owner_id {
            voucher.assign_to(owner_id);
        }
        self.insert_voucher(&voucher)
    }

    /// Inserts a fully built voucher, keeping its id and timestamps.
    pub fn insert_voucher(&self, voucher: &Voucher) -> ServiceResult<Voucher> {
        Ok(self.repo.insert(voucher)?)
    }

    pub fn get_voucher(&self, voucher_id: VoucherId) -> ServiceResult<Voucher> {
        self.repo
            .find_by_id(voucher_id)?
            .ok_or(ServiceError::VoucherNotFound(voucher_id))
    }

    pub fn get_all_vouchers(&self) -> ServiceResult<Vec<Voucher>> {
        Ok(self.repo.find_all()?)
    }

    pub fn get_vouchers_by_owner(&self, owner_id: CustomerId) -> ServiceResult<Vec<Voucher>> {
        Ok(self.repo.find_by_owner(owner_id)?)
    }

    /// Lists vouchers that expired before the current local time.
    pub fn get_expired_vouchers(&self) -> ServiceResult<Vec<Voucher>> {
        Ok(self.repo.find_expired(now())?)
    }

    /// Assigns the voucher to `owner_id`, replacing any previous owner.
    pub fn assign_voucher(
        &self,
        voucher_id: VoucherId,
        owner_id: CustomerId,
    ) -> ServiceResult<Voucher> {
        let mut voucher = self.get_voucher(voucher_id)?;
        voucher.assign_to(owner_id);
        Ok(self.repo.update(&voucher)?)
    }

    /// Clears the owner so the voucher becomes unassigned.
    pub fn release_voucher(&self, voucher_id: VoucherId) -> ServiceResult<Voucher> {
        let mut voucher = self.get_voucher(voucher_id)?;
        voucher.unassign();
        Ok(self.repo.update(&voucher)?)
    }

    pub fn mark_voucher_used(&self, voucher_id: VoucherId) -> ServiceResult<Voucher> {
        let mut voucher = self.get_voucher(voucher_id)?;
        voucher.mark_used();
        Ok(self.repo.update(&voucher)?)
    }

    pub fn delete_voucher(&self, voucher_id: VoucherId) -> ServiceResult<()> {
        self.get_voucher(voucher_id)?;
        Ok(self.repo.delete(voucher_id)?)
    }
}
