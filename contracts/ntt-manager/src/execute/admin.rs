//! Initialisation, pausing and transceiver manager wiring.

use cosmwasm_std::{
    to_json_binary, Addr, DepsMut, Env, MessageInfo, Response, Storage, Uint128, WasmMsg,
};
use ntt_common::access_control::{
    check_role, grant_role, DEFAULT_ADMIN_ROLE, NTT_MANAGER_ADMIN_ROLE, PAUSER_ROLE,
    RATE_LIMITER_MANAGER_ROLE, UNPAUSER_ROLE, UPGRADABLE_ADMIN_ROLE,
};
use ntt_common::events::{LogBuilder, PAUSED as PAUSED_EVENT, TRANSCEIVER_MANAGER_UPDATED};
use ntt_common::initialisable::{check_initialised, mark_initialised};
use ntt_common::rate_limit::{add_bucket, bucket_id_outbound};
use ntt_common::ContractError;
use transceiver_manager::msg::ExecuteMsg as TransceiverManagerMsg;

use crate::state::{CONFIG, PAUSED};

pub(crate) fn check_not_paused(storage: &dyn Storage) -> Result<(), ContractError> {
    if PAUSED.load(storage)? {
        return Err(ContractError::Paused);
    }
    Ok(())
}

fn add_message_handler_msg(
    transceiver_manager: &Addr,
    admin: &Addr,
) -> Result<WasmMsg, ContractError> {
    Ok(WasmMsg::Execute {
        contract_addr: transceiver_manager.to_string(),
        msg: to_json_binary(&TransceiverManagerMsg::AddMessageHandler {
            admin: admin.to_string(),
        })?,
        funds: vec![],
    })
}

pub fn execute_initialise(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    admin: String,
) -> Result<Response, ContractError> {
    mark_initialised(deps.storage, &info.sender)?;
    let admin = deps.api.addr_validate(&admin)?;

    // unlimited until configured
    add_bucket(
        deps.storage,
        &bucket_id_outbound(),
        Uint128::zero(),
        0,
        env.block.time.seconds(),
    )?;

    let mut events = vec![];
    for role in [
        DEFAULT_ADMIN_ROLE,
        RATE_LIMITER_MANAGER_ROLE,
        UPGRADABLE_ADMIN_ROLE,
        NTT_MANAGER_ADMIN_ROLE,
    ] {
        events.extend(grant_role(deps.storage, &role, &admin, &info.sender)?);
    }

    let config = CONFIG.load(deps.storage)?;
    let register = add_message_handler_msg(&config.transceiver_manager, &admin)?;

    Ok(Response::new()
        .add_message(register)
        .add_events(events)
        .add_attribute("method", "initialise")
        .add_attribute("admin", admin)
        .add_attribute("transceiver_manager", config.transceiver_manager))
}

pub fn execute_pause(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    check_initialised(deps.storage)?;
    check_role(deps.storage, &PAUSER_ROLE, &info.sender)?;
    check_not_paused(deps.storage)?;

    PAUSED.save(deps.storage, &true)?;
    let event = LogBuilder::new(&PAUSED_EVENT).boolean(true).build()?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "pause")
        .add_attribute("paused_by", info.sender))
}

pub fn execute_unpause(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    check_initialised(deps.storage)?;
    check_role(deps.storage, &UNPAUSER_ROLE, &info.sender)?;
    if !PAUSED.load(deps.storage)? {
        return Err(ContractError::NotPaused);
    }

    PAUSED.save(deps.storage, &false)?;
    let event = LogBuilder::new(&PAUSED_EVENT).boolean(false).build()?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "unpause")
        .add_attribute("unpaused_by", info.sender))
}

/// Messages attested at the previous transceiver manager are not carried over.
pub fn execute_set_transceiver_manager(
    deps: DepsMut,
    info: MessageInfo,
    admin: String,
    transceiver_manager: String,
) -> Result<Response, ContractError> {
    check_initialised(deps.storage)?;
    check_role(deps.storage, &NTT_MANAGER_ADMIN_ROLE, &info.sender)?;

    let admin = deps.api.addr_validate(&admin)?;
    let transceiver_manager = deps.api.addr_validate(&transceiver_manager)?;
    let mut config = CONFIG.load(deps.storage)?;
    config.transceiver_manager = transceiver_manager.clone();
    CONFIG.save(deps.storage, &config)?;

    let event = LogBuilder::new(&TRANSCEIVER_MANAGER_UPDATED)
        .string(transceiver_manager.as_str())
        .build()?;
    Ok(Response::new()
        .add_message(add_message_handler_msg(&transceiver_manager, &admin)?)
        .add_event(event)
        .add_attribute("method", "set_transceiver_manager")
        .add_attribute("transceiver_manager", transceiver_manager))
}

pub fn execute_set_threshold(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    threshold: u64,
) -> Result<Response, ContractError> {
    check_initialised(deps.storage)?;
    check_role(deps.storage, &NTT_MANAGER_ADMIN_ROLE, &info.sender)?;
    if threshold == 0 {
        return Err(ContractError::ZeroThreshold);
    }

    let config = CONFIG.load(deps.storage)?;
    let msg = WasmMsg::Execute {
        contract_addr: config.transceiver_manager.to_string(),
        msg: to_json_binary(&TransceiverManagerMsg::SetThreshold {
            handler: env.contract.address.to_string(),
            threshold,
        })?,
        funds: vec![],
    };
    Ok(Response::new()
        .add_message(msg)
        .add_attribute("method", "set_threshold")
        .add_attribute("threshold", threshold.to_string()))
}
