//! Message types for the Wormhole transceiver

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary};
use ntt_common::access_control::{HasRoleResponse, RoleAdminResponse, RoleIdsResponse};
use ntt_common::fee::FeePayment;
use ntt_common::timelock::{MinUpgradeDelayResponse, UpgradeStatusResponse};
use ntt_common::transceiver::QuoteResponse;

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
pub struct InstantiateMsg {
    pub transceiver_manager: String,
    pub fee_denom: String,
    /// Wormhole core contract
    pub wormhole_core: String,
    /// Wormhole chain id of this chain
    pub chain_id: u16,
    pub min_upgrade_delay: u64,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Grant DEFAULT_ADMIN, UPGRADABLE_ADMIN and MANAGER to `admin`
    /// (creator only, once)
    Initialise { admin: String },

    /// Called by the transceiver manager with the exact fee attached
    SendMessage {
        fee_payment: FeePayment,
        message: Binary,
        transceiver_instruction: Binary,
    },

    /// Register the peer transceiver of a remote chain (MANAGER)
    SetWormholePeer { chain_id: u16, peer: Binary },

    /// Verify a VAA through the core and deliver its message
    ReceiveMessage { vaa: Binary },

    GrantRole { role: Binary, account: String },
    RevokeRole { role: Binary, account: String },
    RenounceRole { role: Binary },
    SetRoleAdmin { role: Binary, admin_role: Binary },

    UpdateMinUpgradeDelay { delay: u64, timestamp: u64 },
    ScheduleContractUpgrade { code_id: u64, timestamp: u64 },
    CancelContractUpgrade {},
    CompleteContractUpgrade {},
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(QuoteResponse)]
    QuoteDeliveryPrice {
        message: Binary,
        transceiver_instruction: Binary,
    },

    /// `None` when no peer is registered for the chain
    #[returns(Option<Binary>)]
    WormholePeer { chain_id: u16 },

    #[returns(ConfigResponse)]
    Config {},

    #[returns(String)]
    TransceiverType {},

    #[returns(bool)]
    IsVaaConsumed { vaa_digest: Binary },

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
    pub transceiver_manager: Addr,
    pub fee_denom: String,
    pub wormhole_core: Addr,
    pub chain_id: u16,
}
