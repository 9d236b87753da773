//! NTT Token - CW20 token minted by the NTT manager
//!
//! Balances and allowances are plain cw20-base. Minting is gated by the
//! `MINTER` role and only available once the creator has called `Initialise`.
//! The manager burns outbound amounts through `BurnFrom` on an allowance the
//! sender granted beforehand.
//!
//! A token instantiated with an `existing_asset` mints nothing. It holds a
//! CW20 or native asset instead: `BurnFrom` locks the owner's asset in the
//! token and `Mint` releases it from there.

pub mod contract;
pub mod custody;
pub mod error;
pub mod msg;
pub mod state;

pub use crate::error::TokenError;
