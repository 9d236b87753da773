//! Message types for the NTT manager

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Uint128};
use ntt_common::access_control::{HasRoleResponse, RoleAdminResponse, RoleIdsResponse};
use ntt_common::fee::FeePayment;
use ntt_common::rate_limit::RateLimitBucket;
use ntt_common::timelock::{MinUpgradeDelayResponse, UpgradeStatusResponse};
use ntt_common::transceiver::{QuoteResponse, TransceiverInstruction};

use crate::state::{InboundQueuedTransfer, NttManagerPeer, OutboundQueuedTransfer};

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
pub struct InstantiateMsg {
    /// NTT token contract
    pub token: String,
    pub transceiver_manager: String,
    /// Wormhole chain id of this chain
    pub chain_id: u16,
    pub fee_denom: String,
    /// Bech32 prefix of local accounts, e.g. "terra"
    pub bech32_prefix: String,
    pub min_upgrade_delay: u64,
}

#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // Setup
    // ========================================================================
    /// Create the unlimited outbound bucket, grant DEFAULT_ADMIN,
    /// RATE_LIMITER_MANAGER, UPGRADABLE_ADMIN and NTT_MANAGER_ADMIN to
    /// `admin`, and register with the transceiver manager (creator only, once)
    Initialise { admin: String },

    /// PAUSER
    Pause {},
    /// UNPAUSER
    Unpause {},

    /// Register with a new transceiver manager, `admin` becoming this
    /// handler's admin there (NTT_MANAGER_ADMIN)
    SetTransceiverManager {
        admin: String,
        transceiver_manager: String,
    },

    /// Attestation threshold at the transceiver manager (NTT_MANAGER_ADMIN)
    SetThreshold { threshold: u64 },

    // ========================================================================
    // Peers
    // ========================================================================
    /// Bind the peer manager of a remote chain (NTT_MANAGER_ADMIN). A new
    /// peer gets an unlimited inbound bucket.
    SetNttManagerPeer {
        chain_id: u16,
        peer_contract: Binary,
        decimals: u8,
    },

    /// Change the decimals of an existing peer (NTT_MANAGER_ADMIN)
    SetNttManagerPeerDecimals { chain_id: u16, decimals: u8 },

    // ========================================================================
    // Rate Limits (RATE_LIMITER_MANAGER)
    // ========================================================================
    SetOutboundRateLimit { limit: Uint128 },
    SetOutboundRateDuration { duration: u64 },
    SetInboundRateLimit { chain_id: u16, limit: Uint128 },
    SetInboundRateDuration { chain_id: u16, duration: u64 },

    // ========================================================================
    // Transfers
    // ========================================================================
    /// Burn `amount` from the sender (requires an allowance for this
    /// contract) and send it to `recipient` on `recipient_chain`. The delivery
    /// fee is attached in the fee denom and must match the quote exactly.
    Transfer {
        fee_payment: FeePayment,
        amount: Uint128,
        recipient_chain: u16,
        recipient: Binary,
        /// Queue instead of failing when the outbound bucket lacks capacity
        #[serde(default)]
        should_queue: bool,
        #[serde(default)]
        transceiver_instructions: Vec<TransceiverInstruction>,
    },

    /// Send a queued outbound transfer once the outbound duration elapsed
    CompleteOutboundQueuedTransfer {
        fee_payment: FeePayment,
        message_id: Binary,
    },

    /// Original sender only; the burned amount is minted back
    CancelOutboundQueuedTransfer { message_id: Binary },

    /// Mint a queued inbound transfer once the inbound duration elapsed
    CompleteInboundQueuedTransfer { message_digest: Binary },

    /// Called by the transceiver manager once a message reached its threshold
    HandleMessage { message: Binary },

    // ========================================================================
    // Access Control
    // ========================================================================
    GrantRole { role: Binary, account: String },
    RevokeRole { role: Binary, account: String },
    RenounceRole { role: Binary },
    SetRoleAdmin { role: Binary, admin_role: Binary },

    // ========================================================================
    // Upgrades
    // ========================================================================
    UpdateMinUpgradeDelay { delay: u64, timestamp: u64 },
    ScheduleContractUpgrade { code_id: u64, timestamp: u64 },
    CancelContractUpgrade {},
    CompleteContractUpgrade {},
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},

    #[returns(bool)]
    IsPaused {},

    /// `None` when no peer is bound for the chain
    #[returns(Option<NttManagerPeer>)]
    NttManagerPeer { chain_id: u16 },

    /// Total delivery fee for a transfer to `recipient_chain`
    #[returns(QuoteResponse)]
    QuoteDeliveryPrice {
        recipient_chain: u16,
        #[serde(default)]
        transceiver_instructions: Vec<TransceiverInstruction>,
    },

    // ========================================================================
    // Rate Limits
    // ========================================================================
    #[returns(Binary)]
    OutboundBucketId {},

    #[returns(Binary)]
    InboundBucketId { chain_id: u16 },

    /// `None` for an unknown bucket
    #[returns(Option<RateLimitBucket>)]
    RateLimitBucket { bucket_id: Binary },

    #[returns(Uint128)]
    RateLimit { bucket_id: Binary },

    #[returns(u64)]
    RateDuration { bucket_id: Binary },

    #[returns(Uint128)]
    CurrentOutboundCapacity {},

    #[returns(Uint128)]
    CurrentInboundCapacity { chain_id: u16 },

    #[returns(OutboundQueuedTransferResponse)]
    OutboundQueuedTransfer { message_id: Binary },

    #[returns(InboundQueuedTransferResponse)]
    InboundQueuedTransfer { message_digest: Binary },

    // ========================================================================
    // Messages
    // ========================================================================
    #[returns(bool)]
    IsMessageExecuted { message_digest: Binary },

    #[returns(u64)]
    MessageSequence {},

    // ========================================================================
    // Access Control And Upgrades
    // ========================================================================
    #[returns(HasRoleResponse)]
    HasRole { role: Binary, account: String },

    #[returns(RoleAdminResponse)]
    RoleAdmin { role: Binary },

    #[returns(RoleIdsResponse)]
    RoleIds {},

    #[returns(bool)]
    IsInitialised {},

    #[returns(MinUpgradeDelayResponse)]
    MinUpgradeDelay {},

    #[returns(UpgradeStatusResponse)]
    UpgradeStatus {},
}

#[cw_serde]
pub struct ConfigResponse {
    pub token: Addr,
    pub token_decimals: u8,
    pub transceiver_manager: Addr,
    pub chain_id: u16,
    pub fee_denom: String,
    pub bech32_prefix: String,
}

#[cw_serde]
pub struct OutboundQueuedTransferResponse {
    /// Whether the outbound duration has elapsed since queueing
    pub can_complete: bool,
    pub transfer: OutboundQueuedTransfer,
}

#[cw_serde]
pub struct InboundQueuedTransferResponse {
    /// Whether the inbound duration has elapsed since queueing
    pub can_complete: bool,
    pub transfer: InboundQueuedTransfer,
}
