//! Wormhole transceiver payload
//!
//! ```text
//! prefix               4   0x9945FF10
//! source_address      32
//! handler_address     32
//! handler_payload      2 + n   id (32) ∥ user_address (32) ∥ u16 len ∥ payload
//! transceiver_payload  2 + m   currently always empty
//! ```

use ntt_common::codec::{MessageToSend, Reader};
use ntt_common::ContractError;

pub const WH_TRANSCEIVER_PAYLOAD_PREFIX: [u8; 4] = [0x99, 0x45, 0xFF, 0x10];

/// Fields recovered from an inbound payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransceiverPayload {
    pub source_address: [u8; 32],
    pub handler_address: [u8; 32],
    pub message_id: [u8; 32],
    pub user_address: [u8; 32],
    pub payload: Vec<u8>,
}

fn length_prefix(len: usize, what: &str) -> Result<[u8; 2], ContractError> {
    u16::try_from(len)
        .map(u16::to_be_bytes)
        .map_err(|_| ContractError::MalformedEnvelope {
            reason: format!("{} of {} bytes exceeds u16 length", what, len),
        })
}

pub fn encode(message: &MessageToSend) -> Result<Vec<u8>, ContractError> {
    let mut handler_payload = Vec::with_capacity(66 + message.payload.len());
    handler_payload.extend_from_slice(&message.id);
    handler_payload.extend_from_slice(&message.user_address);
    handler_payload.extend_from_slice(&length_prefix(message.payload.len(), "message payload")?);
    handler_payload.extend_from_slice(&message.payload);

    let mut out = Vec::with_capacity(72 + handler_payload.len());
    out.extend_from_slice(&WH_TRANSCEIVER_PAYLOAD_PREFIX);
    out.extend_from_slice(&message.source_address);
    out.extend_from_slice(&message.handler_address);
    out.extend_from_slice(&length_prefix(handler_payload.len(), "handler payload")?);
    out.extend_from_slice(&handler_payload);
    out.extend_from_slice(&0u16.to_be_bytes());
    Ok(out)
}

pub fn decode(data: &[u8]) -> Result<TransceiverPayload, ContractError> {
    let mut reader = Reader::new(data);
    reader.expect_prefix(&WH_TRANSCEIVER_PAYLOAD_PREFIX)?;
    let source_address = reader.array::<32>()?;
    let handler_address = reader.array::<32>()?;
    let handler_payload = reader.prefixed()?;
    // transceiver payload is ignored
    reader.prefixed()?;

    let mut handler = Reader::new(handler_payload);
    let message_id = handler.array::<32>()?;
    let user_address = handler.array::<32>()?;
    let payload = handler.prefixed()?.to_vec();
    if handler.remaining() != 0 {
        return Err(ContractError::MalformedEnvelope {
            reason: format!(
                "message payload length does not match: {} trailing bytes",
                handler.remaining()
            ),
        });
    }

    Ok(TransceiverPayload {
        source_address,
        handler_address,
        message_id,
        user_address,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> MessageToSend {
        MessageToSend {
            id: [1u8; 32],
            user_address: [2u8; 32],
            source_address: [3u8; 32],
            destination_chain_id: 5,
            handler_address: [4u8; 32],
            payload: vec![0xab; 10],
        }
    }

    #[test]
    fn test_layout() {
        let encoded = encode(&message()).unwrap();
        assert_eq!(&encoded[..4], &[0x99, 0x45, 0xFF, 0x10]);
        assert_eq!(&encoded[4..36], &[3u8; 32]);
        assert_eq!(&encoded[36..68], &[4u8; 32]);
        // id + user + u16 + 10 bytes
        assert_eq!(&encoded[68..70], &76u16.to_be_bytes());
        assert_eq!(&encoded[134..136], &10u16.to_be_bytes());
        assert_eq!(&encoded[encoded.len() - 2..], &[0, 0]);
        assert_eq!(encoded.len(), 4 + 32 + 32 + 2 + 76 + 2);

        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.message_id, [1u8; 32]);
        assert_eq!(decoded.user_address, [2u8; 32]);
        assert_eq!(decoded.source_address, [3u8; 32]);
        assert_eq!(decoded.handler_address, [4u8; 32]);
        assert_eq!(decoded.payload, vec![0xab; 10]);
    }

    #[test]
    fn test_wrong_prefix() {
        let mut encoded = encode(&message()).unwrap();
        encoded[0] = 0x00;
        assert!(matches!(
            decode(&encoded).unwrap_err(),
            ContractError::IncorrectPrefix { .. }
        ));
    }

    #[test]
    fn test_inner_length_mismatch() {
        let mut encoded = encode(&message()).unwrap();
        // shrink the declared message payload length by one
        encoded[135] = 9;
        assert!(matches!(
            decode(&encoded).unwrap_err(),
            ContractError::MalformedEnvelope { .. }
        ));
    }

    #[test]
    fn test_truncated() {
        let encoded = encode(&message()).unwrap();
        for len in [0, 3, 40, 69, encoded.len() - 1] {
            assert!(decode(&encoded[..len]).is_err(), "length {}", len);
        }
    }
}
