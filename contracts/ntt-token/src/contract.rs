//! NTT Token - Entry Points

use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult,
    Uint128,
};
use cw2::set_contract_version;
use cw20_base::allowances::{
    execute_burn_from, execute_decrease_allowance, execute_increase_allowance, execute_send_from,
    execute_transfer_from, query_allowance,
};
use cw20_base::contract::{
    execute_burn, execute_send, execute_transfer, query_balance, query_token_info,
};
use cw20_base::state::{BALANCES, TOKEN_INFO};
use ntt_common::access_control::{
    self, check_role, grant_role, RoleIdsResponse, DEFAULT_ADMIN_ROLE, MINTER_ROLE,
    UPGRADABLE_ADMIN_ROLE,
};
use ntt_common::events::{LogBuilder, MINTED};
use ntt_common::initialisable::{check_initialised, is_initialised, mark_initialised, set_creator};
use ntt_common::timelock;

use crate::custody;
use crate::error::{ContractError, TokenError};
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::state::{CONTRACT_NAME, CONTRACT_VERSION, EXISTING_ASSET};

// ============================================================================
// Instantiate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    mut deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, TokenError> {
    if let Some(asset) = &msg.existing_asset {
        if !msg.initial_balances.is_empty() {
            return Err(TokenError::InitialBalancesWithExistingAsset);
        }
        custody::validate_asset(deps.as_ref(), asset)?;
        EXISTING_ASSET.save(deps.storage, asset)?;
    }

    cw20_base::contract::instantiate(
        deps.branch(),
        env,
        info.clone(),
        cw20_base::msg::InstantiateMsg {
            name: msg.name,
            symbol: msg.symbol,
            decimals: msg.decimals,
            initial_balances: msg.initial_balances,
            mint: None,
            marketing: None,
        },
    )?;
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    set_creator(deps.storage, &info.sender)?;
    timelock::init_timelock(deps.storage, msg.min_upgrade_delay)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("creator", info.sender)
        .add_attribute("decimals", msg.decimals.to_string())
        .add_attribute("existing_asset", msg.existing_asset.is_some().to_string()))
}

// ============================================================================
// Execute
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, TokenError> {
    let existing_asset = EXISTING_ASSET.may_load(deps.storage)?;
    if let (Some(_), Some(action)) = (&existing_asset, cw20_action(&msg)) {
        return Err(TokenError::HoldsExistingAsset {
            action: action.to_string(),
        });
    }

    match msg {
        ExecuteMsg::Initialise { admin } => Ok(execute_initialise(deps, info, admin)?),
        ExecuteMsg::Mint { recipient, amount } => match existing_asset {
            Some(asset) => custody::execute_release(deps, info, asset, recipient, amount),
            None => Ok(execute_mint(deps, info, recipient, amount)?),
        },
        ExecuteMsg::SetMinter { minter } => Ok(execute_set_minter(deps, info, minter)?),
        ExecuteMsg::Deposit {} => custody::execute_deposit(deps, info),
        ExecuteMsg::Withdraw { amount } => custody::execute_withdraw(deps, info, amount),

        // CW20
        ExecuteMsg::Transfer { recipient, amount } => {
            Ok(execute_transfer(deps, env, info, recipient, amount)?)
        }
        ExecuteMsg::Burn { amount } => Ok(execute_burn(deps, env, info, amount)?),
        ExecuteMsg::Send {
            contract,
            amount,
            msg,
        } => Ok(execute_send(deps, env, info, contract, amount, msg)?),
        ExecuteMsg::IncreaseAllowance {
            spender,
            amount,
            expires,
        } => Ok(execute_increase_allowance(
            deps, env, info, spender, amount, expires,
        )?),
        ExecuteMsg::DecreaseAllowance {
            spender,
            amount,
            expires,
        } => Ok(execute_decrease_allowance(
            deps, env, info, spender, amount, expires,
        )?),
        ExecuteMsg::TransferFrom {
            owner,
            recipient,
            amount,
        } => Ok(execute_transfer_from(
            deps, env, info, owner, recipient, amount,
        )?),
        ExecuteMsg::SendFrom {
            owner,
            contract,
            amount,
            msg,
        } => Ok(execute_send_from(deps, env, info, owner, contract, amount, msg)?),
        ExecuteMsg::BurnFrom { owner, amount } => match existing_asset {
            Some(asset) => custody::execute_lock(deps, env, info, asset, owner, amount),
            None => Ok(execute_burn_from(deps, env, info, owner, amount)?),
        },

        // Access control
        ExecuteMsg::GrantRole { role, account } => {
            Ok(access_control::execute_grant_role(deps, info, role, account)?)
        }
        ExecuteMsg::RevokeRole { role, account } => {
            Ok(access_control::execute_revoke_role(deps, info, role, account)?)
        }
        ExecuteMsg::RenounceRole { role } => {
            Ok(access_control::execute_renounce_role(deps, info, role)?)
        }
        ExecuteMsg::SetRoleAdmin { role, admin_role } => Ok(
            access_control::execute_set_role_admin(deps, info, role, admin_role)?,
        ),

        // Upgrades
        ExecuteMsg::UpdateMinUpgradeDelay { delay, timestamp } => Ok(
            timelock::execute_update_min_upgrade_delay(deps, env, info, delay, timestamp)?,
        ),
        ExecuteMsg::ScheduleContractUpgrade { code_id, timestamp } => Ok(
            timelock::execute_schedule_contract_upgrade(deps, env, info, code_id, timestamp)?,
        ),
        ExecuteMsg::CancelContractUpgrade {} => {
            Ok(timelock::execute_cancel_contract_upgrade(deps, info)?)
        }
        ExecuteMsg::CompleteContractUpgrade {} => Ok(
            timelock::execute_complete_contract_upgrade(deps, env, info, &MigrateMsg {})?,
        ),
    }
}

/// CW20 operations on the token's own balances
fn cw20_action(msg: &ExecuteMsg) -> Option<&'static str> {
    match msg {
        ExecuteMsg::Transfer { .. } => Some("transfer"),
        ExecuteMsg::Burn { .. } => Some("burn"),
        ExecuteMsg::Send { .. } => Some("send"),
        ExecuteMsg::IncreaseAllowance { .. } => Some("increase_allowance"),
        ExecuteMsg::DecreaseAllowance { .. } => Some("decrease_allowance"),
        ExecuteMsg::TransferFrom { .. } => Some("transfer_from"),
        ExecuteMsg::SendFrom { .. } => Some("send_from"),
        _ => None,
    }
}

fn execute_initialise(
    deps: DepsMut,
    info: MessageInfo,
    admin: String,
) -> Result<Response, ContractError> {
    mark_initialised(deps.storage, &info.sender)?;
    let admin = deps.api.addr_validate(&admin)?;

    let mut events = vec![];
    for role in [DEFAULT_ADMIN_ROLE, UPGRADABLE_ADMIN_ROLE] {
        events.extend(grant_role(deps.storage, &role, &admin, &info.sender)?);
    }

    Ok(Response::new()
        .add_events(events)
        .add_attribute("method", "initialise")
        .add_attribute("admin", admin))
}

fn execute_mint(
    deps: DepsMut,
    info: MessageInfo,
    recipient: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    check_initialised(deps.storage)?;
    check_role(deps.storage, &MINTER_ROLE, &info.sender)?;
    if amount.is_zero() {
        return Err(ContractError::ZeroAmount);
    }
    let recipient = deps.api.addr_validate(&recipient)?;

    let mut token_info = TOKEN_INFO.load(deps.storage)?;
    token_info.total_supply = token_info.total_supply.checked_add(amount)?;
    TOKEN_INFO.save(deps.storage, &token_info)?;
    BALANCES.update(deps.storage, &recipient, |balance| -> StdResult<_> {
        Ok(balance.unwrap_or_default().checked_add(amount)?)
    })?;

    let event = LogBuilder::new(&MINTED)
        .string(recipient.as_str())
        .uint128(amount.u128())
        .build()?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "mint")
        .add_attribute("to", recipient)
        .add_attribute("amount", amount))
}

fn execute_set_minter(
    deps: DepsMut,
    info: MessageInfo,
    minter: String,
) -> Result<Response, ContractError> {
    check_initialised(deps.storage)?;
    let role = Binary::from(MINTER_ROLE.to_vec());
    let response = access_control::execute_grant_role(deps, info, role, minter.clone())?;
    Ok(response
        .add_attribute("action", "set_minter")
        .add_attribute("minter", minter))
}

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Balance { address } => to_json_binary(&query_balance(deps, address)?),
        QueryMsg::TokenInfo {} => to_json_binary(&query_token_info(deps)?),
        QueryMsg::Allowance { owner, spender } => {
            to_json_binary(&query_allowance(deps, owner, spender)?)
        }
        QueryMsg::Custody {} => to_json_binary(&custody::query_custody(deps, env)?),
        QueryMsg::Deposit { address } => to_json_binary(&custody::query_deposit(deps, address)?),
        QueryMsg::HasRole { role, account } => {
            to_json_binary(&access_control::query_has_role(deps, role, account)?)
        }
        QueryMsg::RoleAdmin { role } => {
            to_json_binary(&access_control::query_role_admin(deps, role)?)
        }
        QueryMsg::RoleIds {} => to_json_binary(&RoleIdsResponse::all()),
        QueryMsg::IsInitialised {} => to_json_binary(&is_initialised(deps.storage)?),
        QueryMsg::MinUpgradeDelay {} => {
            to_json_binary(&timelock::query_min_upgrade_delay(deps, env)?)
        }
        QueryMsg::UpgradeStatus {} => to_json_binary(&timelock::query_upgrade_status(deps)?),
    }
}

// ============================================================================
// Migrate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let response = timelock::apply_scheduled_upgrade(deps.storage, &env)?;
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(response)
}
