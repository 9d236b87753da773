//! Wormhole Transceiver
//!
//! Publishes outbound messages through the Wormhole core contract and accepts
//! inbound messages as VAAs, which the core verifies. Only VAAs emitted by the
//! registered peer transceiver of the source chain are accepted, and each VAA
//! is consumed at most once.

pub mod contract;
pub mod msg;
pub mod payload;
pub mod state;
pub mod wormhole;

pub use ntt_common::ContractError;
