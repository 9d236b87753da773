//! Declarative target configuration
//!
//! ```json
//! {
//!   "decimals": 6,
//!   "outbound": { "duration": 86400, "limit": "1000000000000" },
//!   "min_upgrade_delay": 172800,
//!   "inclusion_margin": 300,
//!   "peers": [
//!     {
//!       "wormhole_chain_id": 2,
//!       "ntt_manager": "0x000000000000000000000000...",
//!       "wormhole_transceiver": "0x000000000000000000000000...",
//!       "inbound": { "duration": 86400, "limit": "1000000000000" }
//!     }
//!   ]
//! }
//! ```
//!
//! Peer addresses are kept as given; they are checked when the reconciler
//! reaches the peer so one malformed entry does not stop the others.

use std::path::Path;

use cosmwasm_std::Uint128;
use eyre::{Result, WrapErr};
use ntt_common::hash::hex_to_bytes32;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DECIMALS: u8 = 6;
pub const DEFAULT_RATE_DURATION: u64 = 86_400;
pub const DEFAULT_RATE_LIMIT: u128 = 1_000_000_000_000;
/// Seconds between the block a change is planned against and the block it lands in
pub const DEFAULT_INCLUSION_MARGIN: u64 = 300;

fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

fn default_duration() -> u64 {
    DEFAULT_RATE_DURATION
}

fn default_limit() -> Uint128 {
    Uint128::new(DEFAULT_RATE_LIMIT)
}

fn default_inclusion_margin() -> u64 {
    DEFAULT_INCLUSION_MARGIN
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitTarget {
    #[serde(default = "default_duration")]
    pub duration: u64,
    #[serde(default = "default_limit")]
    pub limit: Uint128,
}

impl Default for RateLimitTarget {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerTarget {
    pub wormhole_chain_id: u16,
    /// Peer manager address, 32 bytes hex
    pub ntt_manager: String,
    /// Peer transceiver address, 32 bytes hex
    pub wormhole_transceiver: String,
    /// Token decimals on the peer chain; the local decimals when omitted
    #[serde(default)]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub inbound: RateLimitTarget,
}

/// Peer addresses after validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerAddresses {
    pub ntt_manager: [u8; 32],
    pub wormhole_transceiver: [u8; 32],
}

impl PeerTarget {
    pub fn addresses(&self) -> std::result::Result<PeerAddresses, String> {
        let ntt_manager = hex_to_bytes32(&self.ntt_manager)
            .map_err(|e| format!("ntt_manager address: {}", e))?;
        let wormhole_transceiver = hex_to_bytes32(&self.wormhole_transceiver)
            .map_err(|e| format!("wormhole_transceiver address: {}", e))?;
        Ok(PeerAddresses {
            ntt_manager,
            wormhole_transceiver,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Local token decimals
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    #[serde(default)]
    pub outbound: RateLimitTarget,
    /// Left alone when absent
    #[serde(default)]
    pub min_upgrade_delay: Option<u64>,
    /// Added to timelocked schedules so they still satisfy the active delay
    /// when the group lands in a later block
    #[serde(default = "default_inclusion_margin")]
    pub inclusion_margin: u64,
    /// Lead each change with a transfer covering the contract's storage cost
    #[serde(default = "default_true")]
    pub fund_storage: bool,
    #[serde(default)]
    pub peers: Vec<PeerTarget>,
}

impl Default for Target {
    fn default() -> Self {
        Self {
            decimals: default_decimals(),
            outbound: RateLimitTarget::default(),
            min_upgrade_delay: None,
            inclusion_margin: default_inclusion_margin(),
            fund_storage: true,
            peers: vec![],
        }
    }
}

impl Target {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).wrap_err("Failed to parse target configuration")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read target {}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn peer_decimals(&self, peer: &PeerTarget) -> u8 {
        peer.decimals.unwrap_or(self.decimals)
    }
}
