//! State definitions for the manual transceiver

use cosmwasm_std::Uint128;
use cw_storage_plus::Item;

pub const CONTRACT_NAME: &str = "crates.io:manual-transceiver";
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Flat price per message in the fee denom
pub const MESSAGE_FEE: Item<Uint128> = Item::new("message_fee");
