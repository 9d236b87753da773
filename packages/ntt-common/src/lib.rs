//! Shared building blocks for the NTT contracts
//!
//! - [`access_control`]: 16-byte roles with per-role admins
//! - [`timelock`]: two-phase values and scheduled code upgrades
//! - [`rate_limit`]: outbound and per-chain inbound buckets
//! - [`codec`]: message envelopes and the layout table they share with events
//! - [`events`]: event schemas and binary logs
//! - [`transceiver`]: the transceiver trait and cross-contract interfaces

pub mod access_control;
pub mod address;
pub mod codec;
pub mod error;
pub mod events;
pub mod fee;
pub mod hash;
pub mod initialisable;
pub mod rate_limit;
pub mod timelock;
pub mod transceiver;
pub mod trimmed_amount;

pub use crate::error::ContractError;
