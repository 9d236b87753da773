//! Message types for the manual transceiver

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Binary, Uint128};
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
    pub message_fee: Uint128,
    pub min_upgrade_delay: u64,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Grant DEFAULT_ADMIN, UPGRADABLE_ADMIN and RELAYER to `admin`
    /// (creator only, once)
    Initialise { admin: String },

    /// Called by the transceiver manager with the exact fee attached
    SendMessage {
        fee_payment: FeePayment,
        message: Binary,
        transceiver_instruction: Binary,
    },

    /// Hand an inbound `MessageReceived` to the transceiver manager (RELAYER)
    DeliverMessage { message: Binary },

    /// DEFAULT_ADMIN
    SetMessageFee { message_fee: Uint128 },

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

    #[returns(Uint128)]
    MessageFee {},

    #[returns(String)]
    TransceiverType {},

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
