//! 16-byte identifier encoding.
//!
//! Identifiers are stored as raw bytes (high 64 bits, then low 64 bits, both
//! big-endian) instead of the 36-character text form.

use super::{CodecError, CodecResult};
use uuid::Uuid;

const ID_BYTES: usize = 16;

pub fn uuid_to_bytes(id: Uuid) -> [u8; ID_BYTES] {
    let (high, low) = id.as_u64_pair();
    let mut bytes = [0_u8; ID_BYTES];
    bytes[..8].copy_from_slice(&high.to_be_bytes());
    bytes[8..].copy_from_slice(&low.to_be_bytes());
    bytes
}

/// Decodes a stored identifier.
///
/// # Errors
/// - Returns [`CodecError::InvalidIdLength`] when `bytes` is not 16 bytes long.
pub fn uuid_from_bytes(bytes: &[u8]) -> CodecResult<Uuid> {
    if bytes.len() != ID_BYTES {
        return Err(CodecError::InvalidIdLength(bytes.len()));
    }
    let mut high = [0_u8; 8];
    let mut low = [0_u8; 8];
    high.copy_from_slice(&bytes[..8]);
    low.copy_from_slice(&bytes[8..]);
    Ok(Uuid::from_u64_pair(
        u64::from_be_bytes(high),
        u64::from_be_bytes(low),
    ))
}

/// Identifier as an owned query parameter.
pub fn id_param(id: Uuid) -> Vec<u8> {
    uuid_to_bytes(id).to_vec()
}

#[cfg(test)]
mod tests {
    use super::{uuid_from_bytes, uuid_to_bytes};
    use crate::codec::CodecError;
    use uuid::Uuid;

    #[test]
    fn bytes_are_high_then_low_big_endian() {
        let id = Uuid::parse_str("00112233-4455-6677-8899-aabbccddeeff").unwrap();
        let bytes = uuid_to_bytes(id);
        assert_eq!(
            bytes,
            [
                0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc,
                0xdd, 0xee, 0xff
            ]
        );
        assert_eq!(bytes, *id.as_bytes());
    }

    #[test]
    fn decode_reverses_encode() {
        let id = Uuid::new_v4();
        assert_eq!(uuid_from_bytes(&uuid_to_bytes(id)).unwrap(), id);
    }

    #[test]
    fn decode_rejects_wrong_length() {
        let text_form = Uuid::new_v4().to_string();
        assert_eq!(
            uuid_from_bytes(text_form.as_bytes()).unwrap_err(),
            CodecError::InvalidIdLength(36)
        );
        assert_eq!(
            uuid_from_bytes(&[]).unwrap_err(),
            CodecError::InvalidIdLength(0)
        );
    }
}
