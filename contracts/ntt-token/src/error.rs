use cosmwasm_std::{StdError, Uint128};
use thiserror::Error;

pub use ntt_common::ContractError;

/// Either a role/initialisation failure or a cw20-base failure
#[derive(Error, Debug, PartialEq)]
pub enum TokenError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Ntt(#[from] ContractError),

    #[error("{0}")]
    Cw20(#[from] cw20_base::ContractError),

    #[error("Token holds an existing asset; {action} is not available")]
    HoldsExistingAsset { action: String },

    #[error("Token does not hold a native asset")]
    NotNativeCustody,

    #[error("Initial balances cannot be set for an existing asset")]
    InitialBalancesWithExistingAsset,

    #[error("Invalid deposit: expected only {denom}")]
    InvalidDeposit { denom: String },

    #[error("Insufficient deposit: {available} available, {requested} requested")]
    InsufficientDeposit {
        available: Uint128,
        requested: Uint128,
    },
}
