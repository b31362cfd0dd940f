//! In-memory customer repository.
//!
//! # Responsibility
//! - Provide a storage-free `CustomerRepository` for fast tests.
//!
//! # Invariants
//! - Each instance owns its own map; there is no process-wide store.
//! - Single operations are serialized by a mutex, but `insert`/`update`
//!   check existence and write under separate lock acquisitions, so
//!   concurrent writers can race.

use super::customer_repo::CustomerRepository;
use super::{RepoError, RepoResult};
use crate::model::customer::{Customer, CustomerId, CustomerPool};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// `HashMap`-backed customer repository.
#[derive(Debug, Default)]
pub struct MemoryCustomerRepository {
    storage: Mutex<HashMap<CustomerId, Customer>>,
}

impl MemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<CustomerId, Customer>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn find_first(&self, predicate: impl Fn(&Customer) -> bool) -> Option<Customer> {
        self.storage().values().find(|c| predicate(c)).cloned()
    }

    fn put(&self, customer: &Customer) -> Customer {
        self.storage()
            .insert(customer.customer_id, customer.clone());
        customer.clone()
    }
}

impl CustomerRepository for MemoryCustomerRepository {
    fn insert(&self, customer: &Customer) -> RepoResult<Customer> {
        if self.find_by_id(customer.customer_id)?.is_some() {
            return Err(RepoError::AlreadyExists(customer.customer_id));
        }
        Ok(self.put(customer))
    }

    fn update(&self, customer: &Customer) -> RepoResult<Customer> {
        if self.find_by_id(customer.customer_id)?.is_none() {
            return Err(RepoError::NotFound(customer.customer_id));
        }
        Ok(self.put(customer))
    }

    fn find_by_id(&self, customer_id: CustomerId) -> RepoResult<Option<Customer>> {
        Ok(self.storage().get(&customer_id).cloned())
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Customer>> {
        Ok(self.find_first(|customer| customer.name == name))
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<Customer>> {
        Ok(self.find_first(|customer| customer.email == email))
    }

    fn find_all(&self) -> RepoResult<Vec<Customer>> {
        Ok(self.storage().values().cloned().collect())
    }

    fn find_all_in_pool(&self, pool: CustomerPool) -> RepoResult<Vec<Customer>> {
        Ok(self
            .storage()
            .values()
            .filter(|customer| pool.contains(customer))
            .cloned()
            .collect())
    }

    fn delete(&self, customer_id: CustomerId) -> RepoResult<()> {
        if self.find_by_id(customer_id)?.is_none() {
            return Err(RepoError::NotFound(customer_id));
        }
        self.storage().remove(&customer_id);
        Ok(())
    }

    fn delete_all(&self) -> RepoResult<usize> {
        let mut storage = self.storage();
        let removed = storage.len();
        storage.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryCustomerRepository;
    use crate::model::customer::{Customer, CustomerPool};
    use crate::repo::customer_repo::CustomerRepository;
    use crate::repo::RepoError;
    use uuid::Uuid;

    #[test]
    fn saved_customer_is_returned_unchanged() {
        let repo = MemoryCustomerRepository::new();
        let customer = Customer::new("test", "test@gmail.com");

        repo.insert(&customer).unwrap();

        assert_eq!(repo.find_by_id(customer.customer_id).unwrap(), Some(customer));
    }

    #[test]
    fn duplicate_id_is_rejected_and_first_copy_kept() {
        let repo = MemoryCustomerRepository::new();
        let id = Uuid::new_v4();
        let first = Customer::with_id(id, "test", "test@gmail.com", false);
        let second = Customer::with_id(id, "test2", "test2@gmail.com", true);

        repo.insert(&first).unwrap();
        let err = repo.insert(&second).unwrap_err();

        assert!(matches!(err, RepoError::AlreadyExists(existing) if existing == id));
        assert_eq!(repo.find_by_id(id).unwrap(), Some(first));
    }

    #[test]
    fn update_and_delete_of_missing_id_are_not_found() {
        let repo = MemoryCustomerRepository::new();
        let stored = Customer::new("kept", "kept@example.com");
        repo.insert(&stored).unwrap();
        let missing = Customer::new("ghost", "ghost@example.com");

        assert!(matches!(
            repo.update(&missing),
            Err(RepoError::NotFound(id)) if id == missing.customer_id
        ));
        assert!(matches!(
            repo.delete(missing.customer_id),
            Err(RepoError::NotFound(id)) if id == missing.customer_id
        ));
        assert_eq!(repo.find_all().unwrap(), vec![stored]);
    }

    #[test]
    fn update_replaces_fields_in_place() {
        let repo = MemoryCustomerRepository::new();
        let mut customer = Customer::new("before", "before@example.com");
        repo.insert(&customer).unwrap();

        customer.name = "after".to_string();
        customer.block();
        repo.update(&customer).unwrap();

        let loaded = repo.find_by_id(customer.customer_id).unwrap().unwrap();
        assert_eq!(loaded.name, "after");
        assert!(loaded.is_blocked);
    }

    #[test]
    fn lookups_by_name_email_and_pool() {
        let repo = MemoryCustomerRepository::new();
        let normal = Customer::new("alice", "alice@example.com");
        let mut blocked = Customer::new("bob", "bob@example.com");
        blocked.block();
        repo.insert(&normal).unwrap();
        repo.insert(&blocked).unwrap();

        assert_eq!(repo.find_by_name("alice").unwrap(), Some(normal.clone()));
        assert_eq!(repo.find_by_email("bob@example.com").unwrap(), Some(blocked.clone()));
        assert_eq!(repo.find_by_name("carol").unwrap(), None);
        assert_eq!(
            repo.find_all_in_pool(CustomerPool::Blocked).unwrap(),
            vec![blocked]
        );
        assert_eq!(repo.find_all_in_pool(CustomerPool::Normal).unwrap(), vec![normal]);
    }

    #[test]
    fn find_all_is_a_snapshot() {
        let repo = MemoryCustomerRepository::new();
        assert!(repo.find_all().unwrap().is_empty());

        let customer = Customer::new("snap", "snap@example.com");
        repo.insert(&customer).unwrap();
        let snapshot = repo.find_all().unwrap();
        assert_eq!(repo.delete_all().unwrap(), 1);

        assert_eq!(snapshot.len(), 1);
        assert!(repo.find_all().unwrap().is_empty());
    }
}
