//! Core domain logic for customers and vouchers.
//! This crate owns the codec, repositories and services; presentation layers
//! stay outside.

pub mod codec;
pub mod db;
pub mod import;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use codec::{CodecError, CodecResult};
pub use import::{import_customers, import_vouchers, ImportError};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::customer::{Customer, CustomerId, CustomerPool};
pub use model::voucher::{Voucher, VoucherId, VoucherKind, VoucherValidationError};
pub use repo::customer_repo::{CustomerRepository, SqliteCustomerRepository};
pub use repo::memory_customer_repo::MemoryCustomerRepository;
pub use repo::voucher_repo::{SqliteVoucherRepository, VoucherRepository};
pub use repo::{RepoError, RepoResult};
pub use service::customer_service::CustomerService;
pub use service::voucher_service::{CreateVoucherRequest, VoucherService};
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
