//! Interface of the Wormhole core contract, limited to what the transceiver uses.

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Binary, Coin};

#[cw_serde]
pub enum WormholeExecuteMsg {
    PostMessage { message: Binary, nonce: u32 },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum WormholeQueryMsg {
    #[returns(GetStateResponse)]
    GetState {},

    /// Fails unless the VAA carries a quorum of valid guardian signatures.
    /// The core names this variant `VerifyVAA`.
    #[returns(ParsedVaa)]
    #[serde(rename = "verify_v_a_a")]
    VerifyVaa { vaa: Binary, block_time: u64 },
}

#[cw_serde]
pub struct GetStateResponse {
    /// Fee charged per posted message
    pub fee: Coin,
}

#[cw_serde]
pub struct ParsedVaa {
    pub version: u8,
    pub guardian_set_index: u32,
    pub timestamp: u32,
    pub nonce: u32,
    pub len_signers: u8,
    pub emitter_chain: u16,
    pub emitter_address: Vec<u8>,
    pub sequence: u64,
    pub consistency_level: u8,
    pub payload: Vec<u8>,
    /// Digest of the VAA body
    pub hash: Vec<u8>,
}
