//! Universal 32-byte addresses
//!
//! Local contracts and users are identified on the wire by
//! `keccak256(address string)`. That identity is one-way, so the transceiver
//! manager keeps a reverse map for the handlers it dispatches to.
//!
//! Inbound transfer recipients need to be reversible and use the bech32 payload
//! instead, left-padded to 32 bytes:
//!
//! ```text
//! | 12 zero bytes | 20-byte account address |   (accounts)
//! |        32-byte contract address         |   (contracts)
//! ```

use cosmwasm_std::{Addr, Api, Binary, StdError, StdResult};

use crate::error::ContractError;
use crate::hash::{keccak256, parse_bytes32};

/// Wire identity of a local address
pub fn universal_address(addr: &Addr) -> [u8; 32] {
    keccak256(addr.as_str().as_bytes())
}

/// Parse a remote peer address: exactly 32 bytes and not all zero
pub fn parse_peer_address(value: &Binary) -> Result<[u8; 32], ContractError> {
    let address = parse_bytes32(value)?;
    if address == [0u8; 32] {
        return Err(ContractError::InvalidAddress {
            reason: "peer address cannot be zero".to_string(),
        });
    }
    Ok(address)
}

/// Left-pad a bech32 payload of 20 or 32 bytes to the wire width
pub fn recipient_to_bytes32(addr: &str) -> StdResult<[u8; 32]> {
    let (_, data) = decode_bech32(addr)?;
    let mut out = [0u8; 32];
    match data.len() {
        20 => out[12..].copy_from_slice(&data),
        32 => out.copy_from_slice(&data),
        n => {
            return Err(StdError::generic_err(format!(
                "Invalid address length: expected 20 or 32 bytes, got {}",
                n
            )))
        }
    }
    Ok(out)
}

/// Recover and validate the local recipient encoded in a transfer payload.
pub fn recipient_from_bytes32(
    api: &dyn Api,
    bytes: &[u8; 32],
    hrp: &str,
) -> Result<Addr, ContractError> {
    if bytes == &[0u8; 32] {
        return Err(ContractError::InvalidRecipient);
    }
    let data: &[u8] = if bytes[..12].iter().all(|b| *b == 0) {
        &bytes[12..]
    } else {
        bytes
    };
    let encoded = encode_bech32(data, hrp).map_err(|e| ContractError::InvalidAddress {
        reason: e.to_string(),
    })?;
    api.addr_validate(&encoded)
        .map_err(|e| ContractError::InvalidAddress {
            reason: e.to_string(),
        })
}

// ============================================================================
// Bech32
// ============================================================================

const BECH32_CHARSET: &[u8] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const CHECKSUM_LEN: usize = 6;

/// Decode a bech32 string into its hrp and 8-bit payload, verifying the checksum
pub fn decode_bech32(addr: &str) -> StdResult<(String, Vec<u8>)> {
    if addr.to_lowercase() != addr && addr.to_uppercase() != addr {
        return Err(StdError::generic_err("Mixed-case bech32 string"));
    }
    let lower = addr.to_lowercase();
    let (hrp, data_part) = lower
        .rsplit_once('1')
        .ok_or_else(|| StdError::generic_err("Invalid bech32 format"))?;
    if hrp.is_empty() || data_part.len() < CHECKSUM_LEN + 1 {
        return Err(StdError::generic_err("Bech32 data too short"));
    }

    let values = data_part
        .chars()
        .map(|c| {
            BECH32_CHARSET
                .iter()
                .position(|&x| x as char == c)
                .map(|idx| idx as u8)
                .ok_or_else(|| StdError::generic_err(format!("Invalid bech32 character: {}", c)))
        })
        .collect::<StdResult<Vec<u8>>>()?;

    let mut check = expand_hrp(hrp);
    check.extend_from_slice(&values);
    if polymod(&check) != 1 {
        return Err(StdError::generic_err("Invalid bech32 checksum"));
    }

    let bytes = convert_bits(&values[..values.len() - CHECKSUM_LEN], 5, 8, false)?;
    Ok((hrp.to_string(), bytes))
}

/// Encode an 8-bit payload as bech32 with the given prefix
pub fn encode_bech32(data: &[u8], hrp: &str) -> StdResult<String> {
    let data5 = convert_bits(data, 8, 5, true)?;

    let mut values = expand_hrp(hrp);
    values.extend_from_slice(&data5);
    values.extend_from_slice(&[0u8; CHECKSUM_LEN]);
    let pm = polymod(&values) ^ 1;

    let mut out = String::with_capacity(hrp.len() + 1 + data5.len() + CHECKSUM_LEN);
    out.push_str(hrp);
    out.push('1');
    for v in data5 {
        out.push(BECH32_CHARSET[v as usize] as char);
    }
    for i in 0..CHECKSUM_LEN {
        let v = (pm >> (5 * (5 - i))) & 31;
        out.push(BECH32_CHARSET[v as usize] as char);
    }
    Ok(out)
}

fn convert_bits(data: &[u8], from_bits: u32, to_bits: u32, pad: bool) -> StdResult<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut result = Vec::with_capacity(data.len() * from_bits as usize / to_bits as usize + 1);
    let max_v = (1u32 << to_bits) - 1;

    for &value in data {
        acc = (acc << from_bits) | u32::from(value);
        bits += from_bits;
        while bits >= to_bits {
            bits -= to_bits;
            result.push(((acc >> bits) & max_v) as u8);
        }
    }

    if pad {
        if bits > 0 {
            result.push(((acc << (to_bits - bits)) & max_v) as u8);
        }
    } else if bits >= from_bits || ((acc << (to_bits - bits)) & max_v) != 0 {
        return Err(StdError::generic_err("Invalid padding"));
    }

    Ok(result)
}

fn expand_hrp(hrp: &str) -> Vec<u8> {
    let bytes = hrp.as_bytes();
    let mut result = Vec::with_capacity(bytes.len() * 2 + 1);
    result.extend(bytes.iter().map(|b| b >> 5));
    result.push(0);
    result.extend(bytes.iter().map(|b| b & 31));
    result
}

fn polymod(values: &[u8]) -> u32 {
    const GENERATOR: [u32; 5] = [
        0x3b6a_57b2,
        0x2650_8e6d,
        0x1ea1_19fa,
        0x3d42_33dd,
        0x2a14_62b3,
    ];

    let mut chk: u32 = 1;
    for &v in values {
        let top = chk >> 25;
        chk = ((chk & 0x01ff_ffff) << 5) ^ u32::from(v);
        for (i, gen) in GENERATOR.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= gen;
            }
        }
    }
    chk
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::MockApi;

    #[test]
    fn test_known_terra_address() {
        // 20-byte account
        let addr = "terra1x46rqay4d3cssq8gxxvqz8xt6nwlz4td20k38v";
        let (hrp, data) = decode_bech32(addr).unwrap();
        assert_eq!(hrp, "terra");
        assert_eq!(data.len(), 20);
        assert_eq!(encode_bech32(&data, "terra").unwrap(), addr);
    }

    #[test]
    fn test_account_recipient_is_left_padded() {
        let data = [0x5au8; 20];
        let addr = encode_bech32(&data, "terra").unwrap();
        let bytes = recipient_to_bytes32(&addr).unwrap();
        assert_eq!(&bytes[..12], &[0u8; 12]);
        assert_eq!(&bytes[12..], &data);

        let recovered = recipient_from_bytes32(&MockApi::default(), &bytes, "terra").unwrap();
        assert_eq!(recovered.as_str(), addr);
    }

    #[test]
    fn test_contract_recipient_uses_full_width() {
        let data = [0x7fu8; 32];
        let addr = encode_bech32(&data, "terra").unwrap();
        assert_eq!(recipient_to_bytes32(&addr).unwrap(), data);
    }

    #[test]
    fn test_checksum_is_verified() {
        let addr = encode_bech32(&[1u8; 20], "terra").unwrap();
        let mut corrupted = addr.clone().into_bytes();
        let last = corrupted.len() - 1;
        corrupted[last] = if corrupted[last] == b'q' { b'p' } else { b'q' };
        let corrupted = String::from_utf8(corrupted).unwrap();
        assert!(decode_bech32(&corrupted).is_err());
        assert!(decode_bech32("terra1").is_err());
        assert!(decode_bech32("nodivider").is_err());
    }

    #[test]
    fn test_zero_recipient_rejected() {
        let err = recipient_from_bytes32(&MockApi::default(), &[0u8; 32], "terra").unwrap_err();
        assert_eq!(err, ContractError::InvalidRecipient);
    }

    #[test]
    fn test_peer_address_validation() {
        assert_eq!(
            parse_peer_address(&Binary::from(vec![1u8; 20])).unwrap_err(),
            ContractError::InvalidAddressLength { got: 20 }
        );
        assert!(matches!(
            parse_peer_address(&Binary::from(vec![0u8; 32])).unwrap_err(),
            ContractError::InvalidAddress { .. }
        ));
        assert_eq!(parse_peer_address(&Binary::from(vec![3u8; 32])).unwrap(), [3u8; 32]);
    }

    #[test]
    fn test_universal_address_is_keccak_of_string() {
        let addr = Addr::unchecked("terra1admin");
        assert_eq!(universal_address(&addr), keccak256(b"terra1admin"));
    }
}
