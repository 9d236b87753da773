//! Existing-asset mode: lock on `BurnFrom`, release on `Mint`.
//!
//! A CW20 asset is pulled with `TransferFrom`, so the owner approves the
//! token contract on the asset beforehand. A native asset is deposited
//! first and locked from the owner's deposit.

use cosmwasm_std::{
    to_json_binary, Addr, BankMsg, Coin, CosmosMsg, Deps, DepsMut, Env, MessageInfo, Response,
    StdError, StdResult, Uint128, WasmMsg,
};
use cw20::{BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg};
use ntt_common::access_control::{check_role, MINTER_ROLE};
use ntt_common::events::{LogBuilder, MINTED};
use ntt_common::initialisable::check_initialised;
use ntt_common::ContractError;

use crate::error::TokenError;
use crate::msg::{Asset, CustodyResponse};
use crate::state::{DEPOSITS, EXISTING_ASSET};

pub fn validate_asset(deps: Deps, asset: &Asset) -> Result<(), TokenError> {
    match asset {
        Asset::Cw20 { contract_addr } => {
            deps.api.addr_validate(contract_addr)?;
        }
        Asset::Native { denom } => {
            if denom.is_empty() {
                return Err(StdError::generic_err("Empty denom").into());
            }
        }
    }
    Ok(())
}

/// Move `amount` of the asset from `owner` into the token (MINTER role)
pub fn execute_lock(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    asset: Asset,
    owner: String,
    amount: Uint128,
) -> Result<Response, TokenError> {
    check_initialised(deps.storage)?;
    check_role(deps.storage, &MINTER_ROLE, &info.sender)?;
    if amount.is_zero() {
        return Err(ContractError::ZeroAmount.into());
    }
    let owner = deps.api.addr_validate(&owner)?;

    let mut response = Response::new();
    match asset {
        Asset::Cw20 { contract_addr } => {
            response = response.add_message(WasmMsg::Execute {
                contract_addr,
                msg: to_json_binary(&Cw20ExecuteMsg::TransferFrom {
                    owner: owner.to_string(),
                    recipient: env.contract.address.to_string(),
                    amount,
                })?,
                funds: vec![],
            });
        }
        Asset::Native { .. } => {
            let available = DEPOSITS.may_load(deps.storage, &owner)?.unwrap_or_default();
            let remaining = available
                .checked_sub(amount)
                .map_err(|_| TokenError::InsufficientDeposit {
                    available,
                    requested: amount,
                })?;
            save_deposit(deps, &owner, remaining)?;
        }
    }

    Ok(response
        .add_attribute("method", "lock")
        .add_attribute("owner", owner)
        .add_attribute("amount", amount))
}

/// Send `amount` of the held asset to `recipient` (MINTER role)
pub fn execute_release(
    deps: DepsMut,
    info: MessageInfo,
    asset: Asset,
    recipient: String,
    amount: Uint128,
) -> Result<Response, TokenError> {
    check_initialised(deps.storage)?;
    check_role(deps.storage, &MINTER_ROLE, &info.sender)?;
    if amount.is_zero() {
        return Err(ContractError::ZeroAmount.into());
    }
    let recipient = deps.api.addr_validate(&recipient)?;

    let event = LogBuilder::new(&MINTED)
        .string(recipient.as_str())
        .uint128(amount.u128())
        .build()?;
    Ok(Response::new()
        .add_message(transfer_msg(&asset, &recipient, amount)?)
        .add_event(event)
        .add_attribute("method", "release")
        .add_attribute("to", recipient)
        .add_attribute("amount", amount))
}

pub fn execute_deposit(deps: DepsMut, info: MessageInfo) -> Result<Response, TokenError> {
    check_initialised(deps.storage)?;
    let denom = native_denom(deps.as_ref())?;

    let amount = match info.funds.as_slice() {
        [Coin { denom: d, amount }] if *d == denom && !amount.is_zero() => *amount,
        _ => return Err(TokenError::InvalidDeposit { denom }),
    };
    let balance = DEPOSITS
        .may_load(deps.storage, &info.sender)?
        .unwrap_or_default()
        .checked_add(amount)
        .map_err(ContractError::from)?;
    save_deposit(deps, &info.sender, balance)?;

    Ok(Response::new()
        .add_attribute("method", "deposit")
        .add_attribute("owner", info.sender)
        .add_attribute("amount", amount))
}

pub fn execute_withdraw(
    deps: DepsMut,
    info: MessageInfo,
    amount: Uint128,
) -> Result<Response, TokenError> {
    let denom = native_denom(deps.as_ref())?;
    if amount.is_zero() {
        return Err(ContractError::ZeroAmount.into());
    }

    let available = DEPOSITS
        .may_load(deps.storage, &info.sender)?
        .unwrap_or_default();
    let remaining = available
        .checked_sub(amount)
        .map_err(|_| TokenError::InsufficientDeposit {
            available,
            requested: amount,
        })?;
    save_deposit(deps, &info.sender, remaining)?;

    Ok(Response::new()
        .add_message(BankMsg::Send {
            to_address: info.sender.to_string(),
            amount: vec![Coin { denom, amount }],
        })
        .add_attribute("method", "withdraw")
        .add_attribute("owner", info.sender)
        .add_attribute("amount", amount))
}

fn native_denom(deps: Deps) -> Result<String, TokenError> {
    match EXISTING_ASSET.may_load(deps.storage)? {
        Some(Asset::Native { denom }) => Ok(denom),
        _ => Err(TokenError::NotNativeCustody),
    }
}

fn save_deposit(deps: DepsMut, owner: &Addr, amount: Uint128) -> StdResult<()> {
    if amount.is_zero() {
        DEPOSITS.remove(deps.storage, owner);
        Ok(())
    } else {
        DEPOSITS.save(deps.storage, owner, &amount)
    }
}

fn transfer_msg(asset: &Asset, recipient: &Addr, amount: Uint128) -> StdResult<CosmosMsg> {
    Ok(match asset {
        Asset::Cw20 { contract_addr } => WasmMsg::Execute {
            contract_addr: contract_addr.clone(),
            msg: to_json_binary(&Cw20ExecuteMsg::Transfer {
                recipient: recipient.to_string(),
                amount,
            })?,
            funds: vec![],
        }
        .into(),
        Asset::Native { denom } => BankMsg::Send {
            to_address: recipient.to_string(),
            amount: vec![Coin {
                denom: denom.clone(),
                amount,
            }],
        }
        .into(),
    })
}

// ============================================================================
// Queries
// ============================================================================

pub fn query_custody(deps: Deps, env: Env) -> StdResult<CustodyResponse> {
    let asset = EXISTING_ASSET.may_load(deps.storage)?;
    let held = match &asset {
        None => Uint128::zero(),
        Some(Asset::Native { denom }) => {
            deps.querier
                .query_balance(&env.contract.address, denom)?
                .amount
        }
        Some(Asset::Cw20 { contract_addr }) => {
            let res: BalanceResponse = deps.querier.query_wasm_smart(
                contract_addr,
                &Cw20QueryMsg::Balance {
                    address: env.contract.address.to_string(),
                },
            )?;
            res.balance
        }
    };
    Ok(CustodyResponse { asset, held })
}

pub fn query_deposit(deps: Deps, address: String) -> StdResult<Uint128> {
    let address = deps.api.addr_validate(&address)?;
    Ok(DEPOSITS.may_load(deps.storage, &address)?.unwrap_or_default())
}
