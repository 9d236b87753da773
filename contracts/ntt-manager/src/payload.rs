//! NTT transfer payload
//!
//! ```text
//! prefix            4   0x994E5454
//! decimals          1   decimals of the trimmed amount
//! amount            8   trimmed amount, big-endian
//! source_token     32
//! recipient        32
//! recipient_chain   2
//! ```
//!
//! Bytes after `recipient_chain` are ignored on decode.

use ntt_common::codec::Reader;
use ntt_common::trimmed_amount::TrimmedAmount;
use ntt_common::ContractError;

pub const NTT_PAYLOAD_PREFIX: [u8; 4] = [0x99, 0x4E, 0x54, 0x54];

pub const NTT_PAYLOAD_LEN: usize = 4 + 1 + 8 + 32 + 32 + 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeTokenTransfer {
    pub amount: TrimmedAmount,
    pub source_token: [u8; 32],
    pub recipient: [u8; 32],
    pub recipient_chain: u16,
}

impl NativeTokenTransfer {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NTT_PAYLOAD_LEN);
        out.extend_from_slice(&NTT_PAYLOAD_PREFIX);
        out.push(self.amount.decimals);
        out.extend_from_slice(&self.amount.amount.to_be_bytes());
        out.extend_from_slice(&self.source_token);
        out.extend_from_slice(&self.recipient);
        out.extend_from_slice(&self.recipient_chain.to_be_bytes());
        out
    }

    pub fn decode(data: &[u8]) -> Result<Self, ContractError> {
        let mut reader = Reader::new(data);
        reader.expect_prefix(&NTT_PAYLOAD_PREFIX)?;
        let decimals = reader.u8()?;
        let amount = reader.u64()?;
        let source_token = reader.array::<32>()?;
        let recipient = reader.array::<32>()?;
        let recipient_chain = reader.u16()?;
        Ok(Self {
            amount: TrimmedAmount { amount, decimals },
            source_token,
            recipient,
            recipient_chain,
        })
    }
}
