//! Use-case services over repository traits.
//!
//! # Responsibility
//! - Turn repository misses into not-found errors carrying the requested id.
//! - Keep callers decoupled from storage details.

use crate::codec::CodecError;
use crate::model::customer::{CustomerId, CustomerPool};
use crate::model::voucher::{VoucherId, VoucherValidationError};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod customer_service;
pub mod voucher_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level error for customer and voucher use-cases.
#[derive(Debug)]
pub enum ServiceError {
    CustomerNotFound {
        customer_id: CustomerId,
        pool: CustomerPool,
    },
    VoucherNotFound(VoucherId),
    /// Request text (owner id, type tag) could not be decoded.
    InvalidRequest(CodecError),
    Validation(VoucherValidationError),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CustomerNotFound {
                customer_id,
                pool: CustomerPool::Normal,
            } => write!(f, "can not find a customer for {customer_id}"),
            Self::CustomerNotFound {
                customer_id,
                pool: CustomerPool::Blocked,
            } => write!(f, "can not find a black customer for {customer_id}"),
            Self::VoucherNotFound(voucher_id) => {
                write!(f, "can not find a voucher for {voucher_id}")
            }
            Self::InvalidRequest(err) => write!(f, "invalid request: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRequest(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<CodecError> for ServiceError {
    fn from(value: CodecError) -> Self {
        Self::InvalidRequest(value)
    }
}

impl From<VoucherValidationError> for ServiceError {
    fn from(value: VoucherValidationError) -> Self {
        Self::Validation(value)
    }
}
