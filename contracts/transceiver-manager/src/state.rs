//! State definitions for the transceiver manager

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary};
use cw_storage_plus::{Item, Map};

pub const CONTRACT_NAME: &str = "crates.io:transceiver-manager";
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cw_serde]
pub struct Config {
    /// Native denom delivery fees are paid in
    pub fee_denom: String,
}

/// Per-handler transceiver configuration
#[cw_serde]
pub struct HandlerConfig {
    /// Ordered; transceiver instructions must follow this order
    pub transceivers: Vec<Addr>,
    /// Matching attestations needed before a message is released
    pub threshold: u64,
}

/// Attestation progress of one inbound message
#[cw_serde]
pub struct AttestationRecord {
    pub message_digest: Binary,
    pub num_attestations: u64,
    pub executed: bool,
}

pub const CONFIG: Item<Config> = Item::new("config");

pub const HANDLERS: Map<&Addr, HandlerConfig> = Map::new("handlers");

/// Universal address -> handler, so inbound messages can be routed
pub const HANDLER_BY_UNIVERSAL: Map<&[u8], Addr> = Map::new("handler_by_universal");

/// (handler, source chain, message id) -> record
pub const ATTESTATIONS: Map<(&Addr, u16, &[u8]), AttestationRecord> = Map::new("attestations");

/// (message digest, transceiver) -> attested
pub const TRANSCEIVER_ATTESTATIONS: Map<(&[u8], &Addr), bool> =
    Map::new("transceiver_attestations");

/// Message digest -> attestations received
pub const NUM_ATTESTATIONS: Map<&[u8], u64> = Map::new("num_attestations");
