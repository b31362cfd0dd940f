//! Conversion between domain records and their flat representations.
//!
//! # Responsibility
//! - Encode identifiers as 16-byte blobs and decode them back.
//! - Dispatch voucher kinds by type tag.
//! - Decode/encode comma-separated import lines.
//! - Encode records for storage and decode rows through [`RowAccess`].
//!
//! # Invariants
//! - Decoding never yields a partially filled record; any bad field fails the
//!   whole call.
//! - Unknown voucher type tags are rejected, never defaulted.

use crate::model::is_storable_timestamp;
use crate::model::voucher::VoucherKind;
use chrono::NaiveDateTime;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

mod binary_id;
mod line;
mod record;

pub use binary_id::{id_param, uuid_from_bytes, uuid_to_bytes};
pub use line::{
    decode_customer_line, decode_voucher_line, encode_customer_line, encode_voucher_line,
    CUSTOMER_FIELD_COUNT, NULL_OWNER_LITERAL, VOUCHER_FIELD_COUNT,
};
pub use record::{
    decode_customer, decode_voucher, encode_customer, encode_voucher, Record, RowAccess,
};

pub type CodecResult<T> = Result<T, CodecError>;

/// Storage and line format for timestamps: ISO local date-time, nanosecond
/// precision, fixed width so text ordering matches time ordering.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";

const TIMESTAMP_PARSE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Decode/encode failure for flat lines and rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Wrong number of fields in a flat line.
    MalformedData {
        entity: &'static str,
        expected_fields: usize,
        actual_fields: usize,
    },
    /// A field could not be parsed into its typed value.
    InvalidField { field: &'static str, value: String },
    /// Voucher type tag is not `PERCENT` or `FIXED`.
    InvalidVoucherType(String),
    /// Binary identifier is not exactly 16 bytes.
    InvalidIdLength(usize),
    /// Row accessor could not provide the column.
    Column { column: &'static str, message: String },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedData {
                entity,
                expected_fields,
                actual_fields,
            } => write!(
                f,
                "malformed {entity} data: expected {expected_fields} fields, got {actual_fields}"
            ),
            Self::InvalidField { field, value } => {
                write!(f, "invalid value `{value}` for field `{field}`")
            }
            Self::InvalidVoucherType(tag) => write!(f, "invalid voucher type `{tag}`"),
            Self::InvalidIdLength(len) => {
                write!(f, "binary identifier must be 16 bytes, got {len}")
            }
            Self::Column { column, message } => {
                write!(f, "cannot read column `{column}`: {message}")
            }
        }
    }
}

impl Error for CodecError {}

/// Maps a type tag to its voucher kind.
///
/// # Errors
/// - Returns [`CodecError::InvalidVoucherType`] for any tag other than
///   `PERCENT` or `FIXED`.
pub fn parse_voucher_kind(tag: &str) -> CodecResult<VoucherKind> {
    match tag {
        "PERCENT" => Ok(VoucherKind::Percent),
        "FIXED" => Ok(VoucherKind::Fixed),
        other => Err(CodecError::InvalidVoucherType(other.to_string())),
    }
}

/// Parses a textual UUID for `field`.
pub fn parse_id(field: &'static str, value: &str) -> CodecResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| invalid_field(field, value))
}

/// Parses an optional owner id; only the literal `null` means unassigned.
pub fn parse_owner_id(value: &str) -> CodecResult<Option<Uuid>> {
    let trimmed = value.trim();
    if trimmed == NULL_OWNER_LITERAL {
        return Ok(None);
    }
    parse_id("owner_id", trimmed).map(Some)
}

/// Parses an ISO local date-time (`YYYY-MM-DDTHH:MM[:SS[.fraction]]`) with a
/// four-digit year.
pub fn parse_timestamp(field: &'static str, value: &str) -> CodecResult<NaiveDateTime> {
    TIMESTAMP_PARSE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .filter(|parsed| is_storable_timestamp(*parsed))
        .ok_or_else(|| invalid_field(field, value))
}

pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_bool(field: &'static str, value: &str) -> CodecResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid_field(field, value)),
    }
}

fn invalid_field(field: &'static str, value: &str) -> CodecError {
    CodecError::InvalidField {
        field,
        value: value.to_string(),
    }
}
