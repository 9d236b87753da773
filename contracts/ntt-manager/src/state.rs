//! State definitions for the NTT manager

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary};
use cw_storage_plus::{Item, Map};
use ntt_common::transceiver::TransceiverInstruction;
use ntt_common::trimmed_amount::TrimmedAmount;

pub const CONTRACT_NAME: &str = "crates.io:ntt-manager";
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cw_serde]
pub struct Config {
    /// NTT token contract (CW20, this contract holds MINTER)
    pub token: Addr,
    /// Decimals of `token`, read at instantiation
    pub token_decimals: u8,
    pub transceiver_manager: Addr,
    /// Wormhole chain id of this chain
    pub chain_id: u16,
    /// Native denom delivery fees are paid in
    pub fee_denom: String,
    /// Bech32 prefix used to decode inbound recipients
    pub bech32_prefix: String,
}

#[cw_serde]
pub struct NttManagerPeer {
    /// Peer manager address (32 bytes)
    pub peer_contract: Binary,
    pub decimals: u8,
}

#[cw_serde]
pub struct OutboundQueuedTransfer {
    pub timestamp: u64,
    pub amount: TrimmedAmount,
    pub recipient_chain: u16,
    pub recipient: Binary,
    pub sender: Addr,
    pub transceiver_instructions: Vec<TransceiverInstruction>,
}

#[cw_serde]
pub struct InboundQueuedTransfer {
    pub timestamp: u64,
    pub amount: TrimmedAmount,
    pub source_chain: u16,
    pub recipient: Addr,
}

pub const CONFIG: Item<Config> = Item::new("config");

pub const PAUSED: Item<bool> = Item::new("paused");

/// Number of message ids handed out so far
pub const MESSAGE_SEQUENCE: Item<u64> = Item::new("message_sequence");

/// Peer chain id -> peer manager
pub const NTT_MANAGER_PEERS: Map<u16, NttManagerPeer> = Map::new("ntt_manager_peers");

/// Message id -> outbound transfer waiting for capacity
pub const OUTBOUND_QUEUED_TRANSFERS: Map<&[u8], OutboundQueuedTransfer> =
    Map::new("outbound_queued_transfers");

/// Message digest -> inbound transfer waiting for capacity
pub const INBOUND_QUEUED_TRANSFERS: Map<&[u8], InboundQueuedTransfer> =
    Map::new("inbound_queued_transfers");

/// Message digest -> handled
pub const MESSAGES_EXECUTED: Map<&[u8], bool> = Map::new("messages_executed");
