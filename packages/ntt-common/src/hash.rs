//! Hashing helpers
//!
//! keccak256 is used for role ids, bucket ids, message ids and message digests.
//! SHA-512/256 is only used to derive the 4-byte event selectors.

use cosmwasm_std::Binary;
use sha2::{Digest, Sha512_256};
use tiny_keccak::{Hasher, Keccak};

use crate::error::ContractError;

/// Compute keccak256 hash of arbitrary data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Compute keccak256 over the concatenation of several slices without
/// allocating an intermediate buffer
pub fn keccak256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Compute SHA-512/256 of arbitrary data
pub fn sha512_256(data: &[u8]) -> [u8; 32] {
    let digest = Sha512_256::digest(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(&digest);
    output
}

/// Derive the message id for the given outbound sequence number.
///
/// The sequence is offset by one so sequence 0 never hashes the all-zero
/// preimage.
pub fn message_id(sequence: u64) -> Result<[u8; 32], ContractError> {
    let offset = sequence
        .checked_add(1)
        .ok_or(ContractError::SequenceExhausted)?;
    Ok(keccak256(&offset.to_be_bytes()))
}

/// Convert bytes32 to a 0x-prefixed hex string
pub fn bytes32_to_hex(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse a 0x-prefixed (or bare) hex string into bytes32
pub fn hex_to_bytes32(input: &str) -> Result<[u8; 32], &'static str> {
    let input = input.strip_prefix("0x").unwrap_or(input);
    if input.len() != 64 {
        return Err("Invalid hex length: expected 64 characters");
    }
    let mut result = [0u8; 32];
    hex::decode_to_slice(input, &mut result).map_err(|_| "Invalid hex character")?;
    Ok(result)
}

/// Parse a 32-byte value from Binary input.
pub fn parse_bytes32(value: &Binary) -> Result<[u8; 32], ContractError> {
    value
        .as_slice()
        .try_into()
        .map_err(|_| ContractError::InvalidAddressLength { got: value.len() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_empty_vector() {
        assert_eq!(
            bytes32_to_hex(&keccak256(b"")),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_keccak_concat_matches_single_buffer() {
        let joined = keccak256(b"INBOUND_\x00\x01");
        let parts = keccak256_concat(&[b"INBOUND_".as_slice(), [0x00u8, 0x01].as_slice()]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn test_message_id_offsets_sequence() {
        // keccak256(u64be(1))
        assert_eq!(
            bytes32_to_hex(&message_id(0).unwrap()),
            "0x6c31fc15422ebad28aaf9089c306702f67540b53c7eea8b7d2941044b027100f"
        );
        assert_ne!(message_id(0).unwrap(), message_id(1).unwrap());
        assert_ne!(message_id(0).unwrap(), [0u8; 32]);
    }

    #[test]
    fn test_message_id_last_sequence() {
        assert!(message_id(u64::MAX - 1).is_ok());
        assert_eq!(message_id(u64::MAX), Err(ContractError::SequenceExhausted));
    }

    #[test]
    fn test_hex_roundtrip_and_errors() {
        let bytes = [0xabu8; 32];
        let encoded = bytes32_to_hex(&bytes);
        assert_eq!(hex_to_bytes32(&encoded).unwrap(), bytes);
        assert_eq!(hex_to_bytes32(&encoded[2..]).unwrap(), bytes);
        assert!(hex_to_bytes32("0x1234").is_err());
        assert!(hex_to_bytes32(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn test_parse_bytes32_rejects_wrong_length() {
        let err = parse_bytes32(&Binary::from(vec![1u8; 31])).unwrap_err();
        assert_eq!(err, ContractError::InvalidAddressLength { got: 31 });
        assert_eq!(parse_bytes32(&Binary::from(vec![1u8; 32])).unwrap(), [1u8; 32]);
    }
}
