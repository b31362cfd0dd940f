//! Customer use-case service.
//!
//! # Invariants
//! - Lookups by id respect the requested pool: a blocked customer is not
//!   returned by `get_customer` and vice versa.
//! - Listing an empty pool returns an empty `Vec`, never an error.

use super::{ServiceError, ServiceResult};
use crate::model::customer::{Customer, CustomerId, CustomerPool};
use crate::repo::customer_repo::CustomerRepository;

/// Use-case service wrapper for customer operations.
pub struct CustomerService<R: CustomerRepository> {
    repo: R,
}

impl<R: CustomerRepository> CustomerService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Gives callers access to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates a customer; duplicate ids surface as `RepoError::AlreadyExists`.
    pub fn create_customer(&self, customer: &Customer) -> ServiceResult<Customer> {
        Ok(self.repo.insert(customer)?)
    }

    /// Gets a non-blocked customer by id.
    pub fn get_customer(&self, customer_id: CustomerId) -> ServiceResult<Customer> {
        self.get_in_pool(customer_id, CustomerPool::Normal)
    }

    /// Gets a blocked customer by id.
    pub fn get_black_customer(&self, customer_id: CustomerId) -> ServiceResult<Customer> {
        self.get_in_pool(customer_id, CustomerPool::Blocked)
    }

    pub fn get_all_customers(&self) -> ServiceResult<Vec<Customer>> {
        Ok(self.repo.find_all_in_pool(CustomerPool::Normal)?)
    }

    pub fn get_all_black_customers(&self) -> ServiceResult<Vec<Customer>> {
        Ok(self.repo.find_all_in_pool(CustomerPool::Blocked)?)
    }

    pub fn find_customer_by_email(&self, email: &str) -> ServiceResult<Option<Customer>> {
        Ok(self.repo.find_by_email(email)?)
    }

    /// Replaces name, email and blocked flag.
    pub fn update_customer(&self, customer: &Customer) -> ServiceResult<Customer> {
        Ok(self.repo.update(customer)?)
    }

    pub fn delete_customer(&self, customer_id: CustomerId) -> ServiceResult<()> {
        Ok(self.repo.delete(customer_id)?)
    }

    fn get_in_pool(&self, customer_id: CustomerId, pool: CustomerPool) -> ServiceResult<Customer> {
        self.repo
            .find_by_id(customer_id)?
            .filter(|customer| pool.contains(customer))
            .ok_or(ServiceError::CustomerNotFound { customer_id, pool })
    }
}
