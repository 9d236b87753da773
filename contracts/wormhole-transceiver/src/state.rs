//! State definitions for the Wormhole transceiver

use cosmwasm_schema::cw_serde;
use cosmwasm_std::Addr;
use cw_storage_plus::{Item, Map};

pub const CONTRACT_NAME: &str = "crates.io:wormhole-transceiver";
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cw_serde]
pub struct Config {
    pub wormhole_core: Addr,
    /// Wormhole chain id of this chain
    pub chain_id: u16,
}

pub const CONFIG: Item<Config> = Item::new("config");

/// Wormhole chain id -> peer transceiver (32 bytes)
pub const WORMHOLE_PEERS: Map<u16, [u8; 32]> = Map::new("wormhole_peers");

/// VAA digest -> consumed
pub const VAAS_CONSUMED: Map<&[u8], bool> = Map::new("vaas_consumed");
