//! Token balances, allowances and token info live in `cw20_base::state`.
//! Roles, timelock and initialisation state live in `ntt_common`.

use cosmwasm_std::{Addr, Uint128};
use cw_storage_plus::{Item, Map};

use crate::msg::Asset;

/// Contract name for migration
pub const CONTRACT_NAME: &str = "crates.io:ntt-token";
/// Contract version
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Set when the token holds a pre-existing asset
pub const EXISTING_ASSET: Item<Asset> = Item::new("existing_asset");

/// Unlocked native deposits by owner
pub const DEPOSITS: Map<&Addr, Uint128> = Map::new("deposits");
