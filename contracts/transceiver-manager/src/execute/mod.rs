//! Execute handlers for the transceiver manager.
//!
//! - `handlers` - Message handler registration, transceiver lists, thresholds
//! - `messaging` - Outbound fan-out and inbound attestation

mod handlers;
mod messaging;

pub use handlers::*;
pub use messaging::*;
