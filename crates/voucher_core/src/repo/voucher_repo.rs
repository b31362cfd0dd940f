//! Voucher repository contract and SQLite implementation.
//!
//! # Invariants
//! - Write paths call `Voucher::validate()` before SQL mutations.
//! - Read paths reject unknown type tags instead of masking them.
//! - `owner_id` is bound as `NULL` for unassigned vouchers.

use super::{ensure_connection_ready, execute_record, is_unique_violation, RepoError, RepoResult};
use crate::codec::{decode_voucher, encode_voucher, format_timestamp, id_param};
use crate::model::customer::CustomerId;
use crate::model::voucher::{Voucher, VoucherId};
use chrono::NaiveDateTime;
use log::{debug, warn};
use rusqlite::{named_params, Connection, Params};

const VOUCHER_SELECT_SQL: &str = "SELECT
    voucher_id,
    owner_id,
    amount,
    type,
    created_at,
    expired_at,
    used
FROM vouchers";

const VOUCHER_ORDER_SQL: &str = "ORDER BY created_at ASC, voucher_id ASC";

/// Repository interface for voucher persistence.
pub trait VoucherRepository {
    /// Inserts a new voucher; fails with `AlreadyExists` on a duplicate id.
    fn insert(&self, voucher: &Voucher) -> RepoResult<Voucher>;
    /// Replaces owner, amount, kind, expiry and used flag.
    fn update(&self, voucher: &Voucher) -> RepoResult<Voucher>;
    fn find_by_id(&self, voucher_id: VoucherId) -> RepoResult<Option<Voucher>>;
    fn find_by_owner(&self, owner_id: CustomerId) -> RepoResult<Vec<Voucher>>;
    /// Returns vouchers whose `expired_at` is strictly before `now`.
    fn find_expired(&self, now: NaiveDateTime) -> RepoResult<Vec<Voucher>>;
    fn find_all(&self) -> RepoResult<Vec<Voucher>>;
    fn delete(&self, voucher_id: VoucherId) -> RepoResult<()>;
    /// Removes every voucher and returns how many were removed.
    fn delete_all(&self) -> RepoResult<usize>;
}

/// SQLite-backed voucher repository.
pub struct SqliteVoucherRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteVoucherRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "vouchers")?;
        Ok(Self { conn })
    }

    fn query_vouchers<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<Voucher>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut vouchers = Vec::new();
        while let Some(row) = rows.next()? {
            vouchers.push(decode_voucher(row)?);
        }
        Ok(vouchers)
    }
}

impl VoucherRepository for SqliteVoucherRepository<'_> {
    fn insert(&self, voucher: &Voucher) -> RepoResult<Voucher> {
        voucher.validate()?;

        let id = voucher.voucher_id;
        let result = execute_record(
            self.conn,
            "INSERT INTO vouchers (voucher_id, owner_id, amount, type, created_at, expired_at, used)
             VALUES (:voucher_id, :owner_id, :amount, :type, :created_at, :expired_at, :used);",
            &encode_voucher(voucher),
        );

        match result {
            Ok(1) => {
                debug!(
                    "event=voucher_insert module=repo status=ok voucher_id={id} type={}",
                    voucher.kind
                );
                Ok(voucher.clone())
            }
            Ok(affected) => {
                warn!(
                    "event=voucher_insert module=repo status=error error_code=create_failed voucher_id={id} affected={affected}"
                );
                Err(RepoError::CreateFailed { id, affected })
            }
            Err(err) if is_unique_violation(&err) => {
                warn!(
                    "event=voucher_insert module=repo status=error error_code=already_exists voucher_id={id}"
                );
                Err(RepoError::AlreadyExists(id))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn update(&self, voucher: &Voucher) -> RepoResult<Voucher> {
        voucher.validate()?;

        let id = voucher.voucher_id;
        let affected = execute_record(
            self.conn,
            "UPDATE vouchers
             SET
                owner_id = :owner_id,
                amount = :amount,
                type = :type,
                expired_at = :expired_at,
                used = :used
             WHERE voucher_id = :voucher_id;",
            &encode_voucher(voucher).without("created_at"),
        )?;

        if affected != 1 {
            warn!(
                "event=voucher_update module=repo status=error error_code=update_failed voucher_id={id} affected={affected}"
            );
            return Err(RepoError::UpdateFailed { id, affected });
        }
        debug!("event=voucher_update module=repo status=ok voucher_id={id}");
        Ok(voucher.clone())
    }

    fn find_by_id(&self, voucher_id: VoucherId) -> RepoResult<Option<Voucher>> {
        Ok(self
            .query_vouchers(
                &format!("{VOUCHER_SELECT_SQL} WHERE voucher_id = :voucher_id;"),
                named_params! { ":voucher_id": id_param(voucher_id) },
            )?
            .into_iter()
            .next())
    }

    fn find_by_owner(&self, owner_id: CustomerId) -> RepoResult<Vec<Voucher>> {
        self.query_vouchers(
            &format!("{VOUCHER_SELECT_SQL} WHERE owner_id = :owner_id {VOUCHER_ORDER_SQL};"),
            named_params! { ":owner_id": id_param(owner_id) },
        )
    }

    fn find_expired(&self, now: NaiveDateTime) -> RepoResult<Vec<Voucher>> {
        self.query_vouchers(
            &format!("{VOUCHER_SELECT_SQL} WHERE expired_at < :now {VOUCHER_ORDER_SQL};"),
            named_params! { ":now": format_timestamp(now) },
        )
    }

    fn find_all(&self) -> RepoResult<Vec<Voucher>> {
        self.query_vouchers(&format!("{VOUCHER_SELECT_SQL} {VOUCHER_ORDER_SQL};"), [])
    }

    fn delete(&self, voucher_id: VoucherId) -> RepoResult<()> {
        let affected = self.conn.execute(
            "DELETE FROM vouchers WHERE voucher_id = :voucher_id;",
            named_params! { ":voucher_id": id_param(voucher_id) },
        )?;

        if affected != 1 {
            warn!(
                "event=voucher_delete module=repo status=error error_code=delete_failed voucher_id={voucher_id} affected={affected}"
            );
            return Err(RepoError::DeleteFailed {
                id: voucher_id,
                affected,
            });
        }
        debug!("event=voucher_delete module=repo status=ok voucher_id={voucher_id}");
        Ok(())
    }

    fn delete_all(&self) -> RepoResult<usize> {
        let affected = self.conn.execute("DELETE FROM vouchers;", [])?;
        debug!("event=voucher_delete_all module=repo status=ok affected={affected}");
        Ok(affected)
    }
}
