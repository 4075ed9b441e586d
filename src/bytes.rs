//! Byte-domain primitives for the 32-byte node type.
//!
//! Every digest in the library is an [`alloy_primitives::B256`]: equality is
//! bytewise and ordering is lexicographic on the raw bytes. The helpers here
//! guard the boundary where callers hand in arbitrary byte material.

use std::cmp::Ordering;

use alloy_primitives::{hex, B256};

use crate::error::{MerkleError, MerkleResult};

/// Lexicographic comparison on raw digest bytes (unsigned).
///
/// This is the order used both for the sorted-pair node hash and for the
/// default leaf sorting policy.
pub fn compare_bytes(a: &B256, b: &B256) -> Ordering {
    a.as_slice().cmp(b.as_slice())
}

/// Converts arbitrary byte material into a digest, rejecting any width other
/// than 32 bytes.
pub fn to_bytes32(data: impl AsRef<[u8]>) -> MerkleResult<B256> {
    let data = data.as_ref();
    if data.len() != 32 {
        return Err(MerkleError::invalid_argument(format!(
            "Expected 32 bytes, got {}",
            data.len()
        )));
    }
    Ok(B256::from_slice(data))
}

/// Renders a digest as a `0x`-prefixed lowercase hex string.
pub fn to_hex(node: &B256) -> String {
    node.to_string()
}

/// Decodes a hex string, with or without the `0x` prefix.
pub(crate) fn decode_hex(text: &str) -> MerkleResult<Vec<u8>> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    hex::decode(digits)
        .map_err(|err| MerkleError::invalid_argument(format!("Invalid hex string: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_and_long_widths() {
        assert!(to_bytes32([0u8; 31]).is_err());
        assert!(to_bytes32([0u8; 33]).is_err());
        assert!(to_bytes32([0u8; 32]).is_ok());
    }

    #[test]
    fn hex_rendering_is_prefixed() {
        let node = B256::repeat_byte(0xab);
        let rendered = to_hex(&node);
        assert!(rendered.starts_with("0x"));
        assert_eq!(rendered.len(), 66);
    }

    #[test]
    fn hex_decoding_accepts_an_optional_prefix() {
        assert_eq!(decode_hex("0xdead").unwrap(), vec![0xde, 0xad]);
        assert_eq!(decode_hex("0Xdead").unwrap(), vec![0xde, 0xad]);
        assert_eq!(decode_hex("dead").unwrap(), vec![0xde, 0xad]);
        assert_eq!(decode_hex("0x").unwrap(), Vec::<u8>::new());
        assert!(decode_hex("0xzz").is_err());
    }
}
