//! Message types for the NTT token

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Binary, Uint128};
use cw20::{
    AllowanceResponse, BalanceResponse, Cw20Coin, Expiration, TokenInfoResponse,
};
use ntt_common::access_control::{HasRoleResponse, RoleAdminResponse, RoleIdsResponse};
use ntt_common::timelock::{MinUpgradeDelayResponse, UpgradeStatusResponse};

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
pub struct InstantiateMsg {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub initial_balances: Vec<Cw20Coin>,
    /// Seconds, at least one day
    pub min_upgrade_delay: u64,
    /// Hold this asset instead of minting a supply of its own. `Mint`
    /// releases it and `BurnFrom` locks it.
    #[serde(default)]
    pub existing_asset: Option<Asset>,
}

/// A pre-existing asset held by the token
#[cw_serde]
pub enum Asset {
    Cw20 { contract_addr: String },
    Native { denom: String },
}

#[cw_serde]
pub struct CustodyResponse {
    pub asset: Option<Asset>,
    /// Amount of the asset the token currently holds, deposits included
    pub held: Uint128,
}

#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // Setup
    // ========================================================================
    /// Grant DEFAULT_ADMIN and UPGRADABLE_ADMIN to `admin` (creator only, once)
    Initialise { admin: String },

    // ========================================================================
    // Minting
    // ========================================================================
    /// Mint to `recipient` (MINTER role)
    Mint { recipient: String, amount: Uint128 },
    /// Grant MINTER to `minter` (admin of MINTER)
    SetMinter { minter: String },

    // ========================================================================
    // Existing Asset
    // ========================================================================
    /// Credit the attached native asset to the sender, to be locked by a
    /// later `BurnFrom`
    Deposit {},
    /// Take back deposited native asset that was not locked
    Withdraw { amount: Uint128 },

    // ========================================================================
    // CW20
    // ========================================================================
    Transfer {
        recipient: String,
        amount: Uint128,
    },
    Burn {
        amount: Uint128,
    },
    Send {
        contract: String,
        amount: Uint128,
        msg: Binary,
    },
    IncreaseAllowance {
        spender: String,
        amount: Uint128,
        expires: Option<Expiration>,
    },
    DecreaseAllowance {
        spender: String,
        amount: Uint128,
        expires: Option<Expiration>,
    },
    TransferFrom {
        owner: String,
        recipient: String,
        amount: Uint128,
    },
    SendFrom {
        owner: String,
        contract: String,
        amount: Uint128,
        msg: Binary,
    },
    BurnFrom {
        owner: String,
        amount: Uint128,
    },

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
    #[returns(BalanceResponse)]
    Balance { address: String },

    #[returns(TokenInfoResponse)]
    TokenInfo {},

    #[returns(AllowanceResponse)]
    Allowance { owner: String, spender: String },

    #[returns(CustodyResponse)]
    Custody {},

    /// Native asset deposited by `address` and not yet locked
    #[returns(Uint128)]
    Deposit { address: String },

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
