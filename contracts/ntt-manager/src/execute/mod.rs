//! Execute handlers for the NTT manager.
//!
//! - `admin` - Initialisation, pause, transceiver manager wiring
//! - `peers` - Peer managers and their decimals
//! - `rate_limits` - Outbound and inbound bucket configuration
//! - `outbound` - Transfers out and the outbound queue
//! - `inbound` - Redeeming attested transfers and the inbound queue

mod admin;
mod inbound;
mod outbound;
mod peers;
mod rate_limits;

pub use admin::*;
pub use inbound::*;
pub use outbound::*;
pub use peers::*;
pub use rate_limits::*;
