//! Customer repository contract and SQLite implementation.
//!
//! # Invariants
//! - Ids are bound as 16-byte blobs.
//! - `created_at` is written once on insert and never updated.
//! - Pool filters use the `is_blocked` column only.

use super::{ensure_connection_ready, execute_record, is_unique_violation, RepoError, RepoResult};
use crate::codec::{decode_customer, encode_customer, id_param};
use crate::model::customer::{Customer, CustomerId, CustomerPool};
use log::{debug, warn};
use rusqlite::{named_params, Connection, Params};

const CUSTOMER_SELECT_SQL: &str = "SELECT
    customer_id,
    name,
    email,
    created_at,
    is_blocked
FROM customers";

const CUSTOMER_ORDER_SQL: &str = "ORDER BY created_at ASC, customer_id ASC";

/// Repository interface for customer persistence.
pub trait CustomerRepository {
    /// Inserts a new customer; fails with `AlreadyExists` on a duplicate id.
    fn insert(&self, customer: &Customer) -> RepoResult<Customer>;
    /// Replaces name, email and blocked flag of an existing customer.
    fn update(&self, customer: &Customer) -> RepoResult<Customer>;
    fn find_by_id(&self, customer_id: CustomerId) -> RepoResult<Option<Customer>>;
    /// Returns the first customer with exactly this name.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Customer>>;
    /// Returns the first customer with exactly this email.
    fn find_by_email(&self, email: &str) -> RepoResult<Option<Customer>>;
    fn find_all(&self) -> RepoResult<Vec<Customer>>;
    /// Returns every customer in `pool`.
    fn find_all_in_pool(&self, pool: CustomerPool) -> RepoResult<Vec<Customer>>;
    fn delete(&self, customer_id: CustomerId) -> RepoResult<()>;
    /// Removes every customer and returns how many were removed.
    fn delete_all(&self) -> RepoResult<usize>;
}

/// SQLite-backed customer repository.
pub struct SqliteCustomerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCustomerRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` when `customers` does not exist.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "customers")?;
        Ok(Self { conn })
    }

    fn query_customers<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<Customer>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut customers = Vec::new();
        while let Some(row) = rows.next()? {
            customers.push(decode_customer(row)?);
        }
        Ok(customers)
    }

    fn query_first<P: Params>(&self, sql: &str, params: P) -> RepoResult<Option<Customer>> {
        Ok(self.query_customers(sql, params)?.into_iter().next())
    }
}

impl CustomerRepository for SqliteCustomerRepository<'_> {
    fn insert(&self, customer: &Customer) -> RepoResult<Customer> {
        let id = customer.customer_id;
        let result = execute_record(
            self.conn,
            "INSERT INTO customers (customer_id, name, email, created_at, is_blocked)
             VALUES (:customer_id, :name, :email, :created_at, :is_blocked);",
            &encode_customer(customer),
        );

        match result {
            Ok(1) => {
                debug!("event=customer_insert module=repo status=ok customer_id={id}");
                Ok(customer.clone())
            }
            Ok(affected) => {
                warn!(
                    "event=customer_insert module=repo status=error error_code=create_failed customer_id={id} affected={affected}"
                );
                Err(RepoError::CreateFailed { id, affected })
            }
            Err(err) if is_unique_violation(&err) => {
                warn!(
                    "event=customer_insert module=repo status=error error_code=already_exists customer_id={id}"
                );
                Err(RepoError::AlreadyExists(id))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn update(&self, customer: &Customer) -> RepoResult<Customer> {
        let id = customer.customer_id;
        let affected = execute_record(
            self.conn,
            "UPDATE customers
             SET
                name = :name,
                email = :email,
                is_blocked = :is_blocked
             WHERE customer_id = :customer_id;",
            &encode_customer(customer).without("created_at"),
        )?;

        if affected != 1 {
            warn!(
                "event=customer_update module=repo status=error error_code=update_failed customer_id={id} affected={affected}"
            );
            return Err(RepoError::UpdateFailed { id, affected });
        }
        debug!("event=customer_update module=repo status=ok customer_id={id}");
        Ok(customer.clone())
    }

    fn find_by_id(&self, customer_id: CustomerId) -> RepoResult<Option<Customer>> {
        self.query_first(
            &format!("{CUSTOMER_SELECT_SQL} WHERE customer_id = :customer_id;"),
            named_params! { ":customer_id": id_param(customer_id) },
        )
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Customer>> {
        self.query_first(
            &format!("{CUSTOMER_SELECT_SQL} WHERE name = :name {CUSTOMER_ORDER_SQL} LIMIT 1;"),
            named_params! { ":name": name },
        )
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<Customer>> {
        self.query_first(
            &format!("{CUSTOMER_SELECT_SQL} WHERE email = :email {CUSTOMER_ORDER_SQL} LIMIT 1;"),
            named_params! { ":email": email },
        )
    }

    fn find_all(&self) -> RepoResult<Vec<Customer>> {
        self.query_customers(&format!("{CUSTOMER_SELECT_SQL} {CUSTOMER_ORDER_SQL};"), [])
    }

    fn find_all_in_pool(&self, pool: CustomerPool) -> RepoResult<Vec<Customer>> {
        self.query_customers(
            &format!("{CUSTOMER_SELECT_SQL} WHERE is_blocked = :is_blocked {CUSTOMER_ORDER_SQL};"),
            named_params! { ":is_blocked": pool.is_blocked() },
        )
    }

    fn delete(&self, customer_id: CustomerId) -> RepoResult<()> {
        let affected = self.conn.execute(
            "DELETE FROM customers WHERE customer_id = :customer_id;",
            named_params! { ":customer_id": id_param(customer_id) },
        )?;

        if affected != 1 {
            warn!(
                "event=customer_delete module=repo status=error error_code=delete_failed customer_id={customer_id} affected={affected}"
            );
            return Err(RepoError::DeleteFailed {
                id: customer_id,
                affected,
            });
        }
        debug!("event=customer_delete module=repo status=ok customer_id={customer_id}");
        Ok(())
    }

    fn delete_all(&self) -> RepoResult<usize> {
        let affected = self.conn.execute("DELETE FROM customers;", [])?;
        debug!("event=customer_delete_all module=repo status=ok affected={affected}");
        Ok(affected)
    }
}
