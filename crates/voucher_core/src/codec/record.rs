//! Storage records and row decoding.
//!
//! # Responsibility
//! - Encode domain records into column-name → value maps for named-parameter
//!   statements.
//! - Decode one entity from anything that can hand out column values.
//!
//! # Invariants
//! - Identifier columns are always 16-byte blobs.
//! - Boolean columns are stored as `0`/`1`; other integers are rejected.
//! - Timestamps are stored as fixed-width text (see `TIMESTAMP_FORMAT`).

use super::{
    format_timestamp, invalid_field, parse_timestamp, parse_voucher_kind, uuid_from_bytes,
    uuid_to_bytes, CodecError, CodecResult,
};
use crate::model::customer::Customer;
use crate::model::voucher::Voucher;
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::Row;
use uuid::Uuid;

/// Read access to one row of named columns.
pub trait RowAccess {
    fn value(&self, column: &'static str) -> CodecResult<Value>;
}

impl RowAccess for Row<'_> {
    fn value(&self, column: &'static str) -> CodecResult<Value> {
        self.get::<_, Value>(column)
            .map_err(|err| CodecError::Column {
                column,
                message: err.to_string(),
            })
    }
}

/// Ordered column-name → value map produced by the encoders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(&'static str, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column`, replacing any previous value.
    pub fn with(mut self, column: &'static str, value: Value) -> Self {
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
        self
    }

    /// Drops `column`; used when a statement does not bind every column.
    pub fn without(mut self, column: &str) -> Self {
        self.fields.retain(|(name, _)| *name != column);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl RowAccess for Record {
    fn value(&self, column: &'static str) -> CodecResult<Value> {
        self.get(column).cloned().ok_or(CodecError::Column {
            column,
            message: "column not present in record".to_string(),
        })
    }
}

pub fn encode_customer(customer: &Customer) -> Record {
    Record::new()
        .with("customer_id", id_value(customer.customer_id))
        .with("name", Value::Text(customer.name.clone()))
        .with("email", Value::Text(customer.email.clone()))
        .with("created_at", timestamp_value(customer.created_at))
        .with("is_blocked", bool_value(customer.is_blocked))
}

pub fn encode_voucher(voucher: &Voucher) -> Record {
    Record::new()
        .with("voucher_id", id_value(voucher.voucher_id))
        .with(
            "owner_id",
            voucher.owner_id.map_or(Value::Null, id_value),
        )
        .with("amount", Value::Integer(voucher.amount))
        .with("type", Value::Text(voucher.kind.as_tag().to_string()))
        .with("created_at", timestamp_value(voucher.created_at))
        .with("expired_at", timestamp_value(voucher.expired_at))
        .with("used", bool_value(voucher.used))
}

/// Decodes a customer from a `customers` row.
pub fn decode_customer<R: RowAccess + ?Sized>(row: &R) -> CodecResult<Customer> {
    Ok(Customer {
        customer_id: read_id(row, "customer_id")?,
        name: read_text(row, "name")?,
        email: read_text(row, "email")?,
        created_at: read_timestamp(row, "created_at")?,
        is_blocked: read_bool(row, "is_blocked")?,
    })
}

/// Decodes a voucher from a `vouchers` row.
///
/// # Errors
/// - [`CodecError::InvalidVoucherType`] when the stored tag is unknown.
///
/// Stored values are returned without range checks, so one odd row never
/// hides the rest of a listing.
pub fn decode_voucher<R: RowAccess + ?Sized>(row: &R) -> CodecResult<Voucher> {
    let kind = parse_voucher_kind(&read_text(row, "type")?)?;
    Ok(Voucher::from_parts(
        read_id(row, "voucher_id")?,
        read_optional_id(row, "owner_id")?,
        kind,
        read_integer(row, "amount")?,
        read_timestamp(row, "created_at")?,
        read_timestamp(row, "expired_at")?,
        read_bool(row, "used")?,
    ))
}

fn id_value(id: Uuid) -> Value {
    Value::Blob(uuid_to_bytes(id).to_vec())
}

fn timestamp_value(value: NaiveDateTime) -> Value {
    Value::Text(format_timestamp(value))
}

fn bool_value(value: bool) -> Value {
    Value::Integer(i64::from(value))
}

fn read_id<R: RowAccess + ?Sized>(row: &R, column: &'static str) -> CodecResult<Uuid> {
    read_optional_id(row, column)?.ok_or_else(|| invalid_field(column, "NULL"))
}

fn read_optional_id<R: RowAccess + ?Sized>(
    row: &R,
    column: &'static str,
) -> CodecResult<Option<Uuid>> {
    match row.value(column)? {
        Value::Null => Ok(None),
        Value::Blob(bytes) => uuid_from_bytes(&bytes).map(Some),
        other => Err(unexpected(column, &other)),
    }
}

fn read_text<R: RowAccess + ?Sized>(row: &R, column: &'static str) -> CodecResult<String> {
    match row.value(column)? {
        Value::Text(text) => Ok(text),
        other => Err(unexpected(column, &other)),
    }
}

fn read_integer<R: RowAccess + ?Sized>(row: &R, column: &'static str) -> CodecResult<i64> {
    match row.value(column)? {
        Value::Integer(value) => Ok(value),
        other => Err(unexpected(column, &other)),
    }
}

fn read_bool<R: RowAccess + ?Sized>(row: &R, column: &'static str) -> CodecResult<bool> {
    match read_integer(row, column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(invalid_field(column, &other.to_string())),
    }
}

fn read_timestamp<R: RowAccess + ?Sized>(
    row: &R,
    column: &'static str,
) -> CodecResult<NaiveDateTime> {
    parse_timestamp(column, &read_text(row, column)?)
}

fn unexpected(column: &'static str, value: &Value) -> CodecError {
    invalid_field(column, &format!("{value:?}"))
}
