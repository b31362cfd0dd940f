//! Customer domain model.
//!
//! # Responsibility
//! - Define the customer record and its pool membership.
//!
//! # Invariants
//! - `customer_id` is the only identity; name and email are not unique keys.
//! - A customer belongs to exactly one pool, derived from `is_blocked`.

use super::now;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type CustomerId = Uuid;

/// Partition of customers by blocked state.
///
/// Blocked customers are historically called "black" customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerPool {
    Normal,
    Blocked,
}

impl CustomerPool {
    pub fn of(is_blocked: bool) -> Self {
        if is_blocked {
            Self::Blocked
        } else {
            Self::Normal
        }
    }

    pub fn is_blocked(self) -> bool {
        matches!(self, Self::Blocked)
    }

    /// Returns whether `customer` currently sits in this pool.
    pub fn contains(self, customer: &Customer) -> bool {
        customer.is_blocked == self.is_blocked()
    }
}

impl Display for CustomerPool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Blocked => write!(f, "blocked"),
        }
    }
}

/// Customer record as stored and returned by repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub name: String,
    pub email: String,
    pub created_at: NaiveDateTime,
    pub is_blocked: bool,
}

impl Customer {
    /// Creates an unblocked customer with a generated id and `created_at = now`.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name, email, false)
    }

    /// Creates a customer with a caller-provided id and `created_at = now`.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(
        customer_id: CustomerId,
        name: impl Into<String>,
        email: impl Into<String>,
        is_blocked: bool,
    ) -> Self {
        Self {
            customer_id,
            name: name.into(),
            email: email.into(),
            created_at: now(),
            is_blocked,
        }
    }

    pub fn pool(&self) -> CustomerPool {
        CustomerPool::of(self.is_blocked)
    }

    pub fn block(&mut self) {
        self.is_blocked = true;
    }

    pub fn unblock(&mut self) {
        self.is_blocked = false;
    }
}
