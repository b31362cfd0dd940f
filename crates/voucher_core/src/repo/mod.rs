//! Repository contracts and persistence implementations.
//!
//! # Responsibility
//! - Define data access traits consumed by services.
//! - Keep SQL and row mapping inside the persistence boundary.
//! - Translate constraint violations and affected-row counts into
//!   [`RepoError`] variants.
//!
//! # Invariants
//! - Lookups by id return `Ok(None)` on a miss; only services turn that into
//!   a not-found error.
//! - Writes succeed only when exactly one row is affected.

use crate::codec::{CodecError, Record};
use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::voucher::VoucherValidationError;
use rusqlite::{ffi, Connection, ErrorCode, ToSql};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod customer_repo;
pub mod memory_customer_repo;
pub mod voucher_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by customer and voucher persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Codec(CodecError),
    Validation(VoucherValidationError),
    /// Update/delete target is absent (memory repository only).
    NotFound(Uuid),
    /// Insert collided with an existing primary key.
    AlreadyExists(Uuid),
    /// Insert affected a row count other than one.
    CreateFailed { id: Uuid, affected: usize },
    /// Update affected a row count other than one; includes a missing id.
    UpdateFailed { id: Uuid, affected: usize },
    /// Delete affected a row count other than one; includes a missing id.
    DeleteFailed { id: Uuid, affected: usize },
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "invalid persisted data: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::AlreadyExists(id) => write!(f, "{id} already exists"),
            Self::CreateFailed { id, affected } => {
                write!(f, "nothing was inserted for {id} (affected rows: {affected})")
            }
            Self::UpdateFailed { id, affected } => {
                write!(f, "nothing was updated for {id} (affected rows: {affected})")
            }
            Self::DeleteFailed { id, affected } => {
                write!(f, "nothing was deleted for {id} (affected rows: {affected})")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is older than required {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<CodecError> for RepoError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<VoucherValidationError> for RepoError {
    fn from(value: VoucherValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Rejects connections that were not opened through `db::open_db*`.
fn ensure_connection_ready(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let actual_version = current_version(conn)?;
    let expected_version = latest_version();
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: bool = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(RepoError::MissingRequiredTable(table));
    }
    Ok(())
}

/// Executes `sql`, binding every record column as `:column`.
fn execute_record(conn: &Connection, sql: &str, record: &Record) -> rusqlite::Result<usize> {
    let names: Vec<String> = record.iter().map(|(column, _)| format!(":{column}")).collect();
    let params: Vec<(&str, &dyn ToSql)> = names
        .iter()
        .map(String::as_str)
        .zip(record.iter().map(|(_, value)| value as &dyn ToSql))
        .collect();
    conn.execute(sql, params.as_slice())
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && (failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    || failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE)
        }
        _ => false,
    }
}
