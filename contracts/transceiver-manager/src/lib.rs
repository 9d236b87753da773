//! Transceiver Manager
//!
//! Message handlers (NTT managers) register here and configure which
//! transceivers carry their messages. Outbound, the manager quotes every
//! configured transceiver and forwards the message with each one's exact fee.
//! Inbound, each transceiver attests to the messages it delivers; once a
//! handler's threshold of matching attestations is reached the message is
//! released to the handler exactly once.
//!
//! - `execute/` - Execute message handlers
//! - `query` - Query message handlers

pub mod contract;
pub mod execute;
pub mod msg;
pub mod query;
pub mod state;

pub use ntt_common::ContractError;
