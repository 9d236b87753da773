//! Manual Transceiver
//!
//! Charges a configured flat `message_fee` per message. Outbound messages are
//! only recorded as events; an off-chain relayer holding the `RELAYER` role
//! carries them across and calls `DeliverMessage` on the destination side.

pub mod contract;
pub mod msg;
pub mod state;

pub use ntt_common::ContractError;
