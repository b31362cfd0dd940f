//! Comma-separated line format used for bootstrap imports.
//!
//! - Voucher: `id,ownerIdOrNull,amount,TYPE,createdAt,expiredAt,used`
//! - Customer: `id,name,email,createdAt,blocked`

use super::{
    format_timestamp, invalid_field, parse_bool, parse_id, parse_owner_id, parse_timestamp,
    parse_voucher_kind, CodecError, CodecResult,
};
use crate::model::customer::Customer;
use crate::model::voucher::Voucher;

pub const VOUCHER_FIELD_COUNT: usize = 7;
pub const CUSTOMER_FIELD_COUNT: usize = 5;
pub const NULL_OWNER_LITERAL: &str = "null";

/// Decodes one voucher line.
///
/// # Errors
/// - [`CodecError::MalformedData`] when the line does not have 7 fields.
/// - [`CodecError::InvalidVoucherType`] for an unknown type tag.
/// - [`CodecError::InvalidField`] for any unparsable field.
///
/// Amount range and expiry order are not checked here; the repository
/// rejects such vouchers on insert.
pub fn decode_voucher_line(line: &str) -> CodecResult<Voucher> {
    let fields = split_fields(line, "voucher", VOUCHER_FIELD_COUNT)?;

    let voucher_id = parse_id("voucher_id", fields[0])?;
    let owner_id = parse_owner_id(fields[1])?;
    let amount = fields[2]
        .parse::<i64>()
        .map_err(|_| invalid_field("amount", fields[2]))?;
    let kind = parse_voucher_kind(fields[3])?;
    let created_at = parse_timestamp("created_at", fields[4])?;
    let expired_at = parse_timestamp("expired_at", fields[5])?;
    let used = parse_bool("used", fields[6])?;

    Ok(Voucher::from_parts(
        voucher_id, owner_id, kind, amount, created_at, expired_at, used,
    ))
}

/// Decodes one customer line.
///
/// # Errors
/// - [`CodecError::MalformedData`] when the line does not have 5 fields.
/// - [`CodecError::InvalidField`] for any unparsable field.
pub fn decode_customer_line(line: &str) -> CodecResult<Customer> {
    let fields = split_fields(line, "customer", CUSTOMER_FIELD_COUNT)?;

    Ok(Customer {
        customer_id: parse_id("customer_id", fields[0])?,
        name: fields[1].to_string(),
        email: fields[2].to_string(),
        created_at: parse_timestamp("created_at", fields[3])?,
        is_blocked: parse_bool("is_blocked", fields[4])?,
    })
}

pub fn encode_voucher_line(voucher: &Voucher) -> String {
    let owner = voucher
        .owner_id
        .map_or_else(|| NULL_OWNER_LITERAL.to_string(), |id| id.to_string());
    format!(
        "{},{},{},{},{},{},{}",
        voucher.voucher_id,
        owner,
        voucher.amount,
        voucher.kind.as_tag(),
        format_timestamp(voucher.created_at),
        format_timestamp(voucher.expired_at),
        voucher.used
    )
}

pub fn encode_customer_line(customer: &Customer) -> String {
    format!(
        "{},{},{},{},{}",
        customer.customer_id,
        customer.name,
        customer.email,
        format_timestamp(customer.created_at),
        customer.is_blocked
    )
}

fn split_fields<'a>(
    line: &'a str,
    entity: &'static str,
    expected_fields: usize,
) -> CodecResult<Vec<&'a str>> {
    let fields: Vec<&str> = if line.trim().is_empty() {
        Vec::new()
    } else {
        line.split(',').map(str::trim).collect()
    };

    if fields.len() != expected_fields {
        return Err(CodecError::MalformedData {
            entity,
            expected_fields,
            actual_fields: fields.len(),
        });
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::{
        decode_customer_line, decode_voucher_line, encode_customer_line, encode_voucher_line,
    };
    use crate::codec::CodecError;
    use crate::model::voucher::VoucherKind;
    use uuid::Uuid;

    const VOUCHER_ID: &str = "6f1c2a4e-0d2b-4c5e-9a8b-7c6d5e4f3a2b";
    const OWNER_ID: &str = "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d";

    fn voucher_fields() -> Vec<String> {
        vec![
            VOUCHER_ID.to_string(),
            OWNER_ID.to_string(),
            "15".to_string(),
            "PERCENT".to_string(),
            "2024-01-01T10:00:00".to_string(),
            "2024-02-01T10:00:00".to_string(),
            "false".to_string(),
        ]
    }

    #[test]
    fn decodes_voucher_line_with_owner() {
        let voucher = decode_voucher_line(&voucher_fields().join(",")).unwrap();
        assert_eq!(voucher.voucher_id, Uuid::parse_str(VOUCHER_ID).unwrap());
        assert_eq!(voucher.owner_id, Some(Uuid::parse_str(OWNER_ID).unwrap()));
        assert_eq!(voucher.amount, 15);
        assert_eq!(voucher.kind, VoucherKind::Percent);
        assert!(!voucher.used);
    }

    #[test]
    fn decodes_voucher_line_with_null_owner_and_padding() {
        let line = format!(
            " {VOUCHER_ID} , null , 5000 , FIXED , 2024-01-01T10:00 , 2024-06-01T00:00 , true "
        );
        let voucher = decode_voucher_line(&line).unwrap();
        assert_eq!(voucher.owner_id, None);
        assert_eq!(voucher.kind, VoucherKind::Fixed);
        assert!(voucher.used);
    }

    #[test]
    fn voucher_line_with_wrong_arity_is_malformed() {
        let full = voucher_fields();
        for count in 0..=6 {
            let line = full[..count].join(",");
            let err = decode_voucher_line(&line).unwrap_err();
            assert_eq!(
                err,
                CodecError::MalformedData {
                    entity: "voucher",
                    expected_fields: 7,
                    actual_fields: count,
                },
                "field count {count}"
            );
        }

        let mut extra = full.clone();
        extra.push("surplus".to_string());
        assert!(matches!(
            decode_voucher_line(&extra.join(",")),
            Err(CodecError::MalformedData {
                actual_fields: 8,
                ..
            })
        ));
    }

    #[test]
    fn voucher_line_with_unknown_type_is_rejected() {
        let mut fields = voucher_fields();
        fields[3] = "BOGO".to_string();
        assert_eq!(
            decode_voucher_line(&fields.join(",")).unwrap_err(),
            CodecError::InvalidVoucherType("BOGO".to_string())
        );
    }

    #[test]
    fn voucher_line_with_bad_timestamp_fails_whole_decode() {
        let mut fields = voucher_fields();
        fields[5] = "2024-02-30T10:00:00".to_string();
        assert!(matches!(
            decode_voucher_line(&fields.join(",")),
            Err(CodecError::InvalidField {
                field: "expired_at",
                ..
            })
        ));
    }

    #[test]
    fn voucher_line_with_out_of_range_amount_still_decodes() {
        let mut fields = voucher_fields();
        fields[1] = "null".to_string();
        fields[2] = "0".to_string();
        fields[3] = "FIXED".to_string();
        let zero = decode_voucher_line(&fields.join(",")).unwrap();
        assert_eq!(zero.amount, 0);
        assert_eq!(zero.kind, VoucherKind::Fixed);
        assert!(zero.validate().is_err());

        fields[2] = "150".to_string();
        fields[3] = "PERCENT".to_string();
        let over = decode_voucher_line(&fields.join(",")).unwrap();
        assert_eq!(over.amount, 150);
        assert_eq!(decode_voucher_line(&encode_voucher_line(&over)).unwrap(), over);
    }

    #[test]
    fn voucher_line_with_empty_owner_is_rejected() {
        let mut fields = voucher_fields();
        fields[1] = String::new();
        assert!(matches!(
            decode_voucher_line(&fields.join(",")),
            Err(CodecError::InvalidField {
                field: "owner_id",
                ..
            })
        ));
    }

    #[test]
    fn voucher_line_with_non_numeric_amount_is_rejected() {
        let mut fields = voucher_fields();
        fields[2] = "ten".to_string();
        assert!(matches!(
            decode_voucher_line(&fields.join(",")),
            Err(CodecError::InvalidField {
                field: "amount",
                ..
            })
        ));
    }

    #[test]
    fn customer_line_roundtrips_through_encoder() {
        let line = "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d,kim,kim@example.com,2024-01-01T10:00:00.5,true";
        let customer = decode_customer_line(line).unwrap();
        assert_eq!(customer.name, "kim");
        assert_eq!(customer.email, "kim@example.com");
        assert!(customer.is_blocked);

        let reencoded = encode_customer_line(&customer);
        assert_eq!(decode_customer_line(&reencoded).unwrap(), customer);
    }

    #[test]
    fn customer_line_with_wrong_arity_is_malformed() {
        let err = decode_customer_line("0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d,kim").unwrap_err();
        assert_eq!(
            err,
            CodecError::MalformedData {
                entity: "customer",
                expected_fields: 5,
                actual_fields: 2,
            }
        );
    }

    #[test]
    fn customer_line_rejects_non_boolean_flag() {
        let line = "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d,kim,kim@example.com,2024-01-01T10:00,yes";
        assert!(matches!(
            decode_customer_line(line),
            Err(CodecError::InvalidField {
                field: "is_blocked",
                ..
            })
        ));
    }

    #[test]
    fn voucher_line_roundtrips_through_encoder() {
        let voucher = decode_voucher_line(&voucher_fields().join(",")).unwrap();
        let reencoded = encode_voucher_line(&voucher);
        assert_eq!(decode_voucher_line(&reencoded).unwrap(), voucher);
    }
}
