//! NTT Manager
//!
//! Moves the NTT token across chains. Outbound transfers burn the sender's
//! tokens and send a transfer payload through the transceiver manager to the
//! peer manager of the destination chain. Inbound transfers arrive from the
//! transceiver manager once enough transceivers attested them and mint to the
//! recipient. Both directions are bounded by rate-limit buckets; transfers
//! beyond capacity are queued.
//!
//! - `execute/` - Execute message handlers
//! - `query` - Query message handlers
//! - `payload` - NTT transfer payload

pub mod contract;
pub mod execute;
pub mod msg;
pub mod payload;
pub mod query;
pub mod state;

pub use ntt_common::ContractError;
