//! Message handler registration and transceiver configuration.

use cosmwasm_std::{Addr, DepsMut, MessageInfo, Response, Storage};
use ntt_common::access_control::{
    check_role, grant_role, message_handler_admin_role, set_role_admin,
};
use ntt_common::address::universal_address;
use ntt_common::events::{
    LogBuilder, MESSAGE_HANDLER_ADDED, THRESHOLD_UPDATED, TRANSCEIVER_ADDED, TRANSCEIVER_REMOVED,
};
use ntt_common::transceiver::MAX_TRANSCEIVERS;
use ntt_common::ContractError;

use crate::state::{HandlerConfig, HANDLERS, HANDLER_BY_UNIVERSAL};

pub(crate) fn load_handler(
    storage: &dyn Storage,
    handler: &Addr,
) -> Result<HandlerConfig, ContractError> {
    HANDLERS
        .may_load(storage, handler)?
        .ok_or_else(|| ContractError::MessageHandlerUnknown {
            handler: handler.to_string(),
        })
}

pub fn execute_add_message_handler(
    deps: DepsMut,
    info: MessageInfo,
    admin: String,
) -> Result<Response, ContractError> {
    let handler = info.sender;
    let admin = deps.api.addr_validate(&admin)?;

    if HANDLERS.has(deps.storage, &handler) {
        return Ok(Response::new()
            .add_attribute("method", "add_message_handler")
            .add_attribute("handler", handler)
            .add_attribute("added", "false"));
    }

    // the admin role administers itself
    let role = message_handler_admin_role(&handler);
    let mut events = vec![];
    events.extend(grant_role(deps.storage, &role, &admin, &handler)?);
    events.push(set_role_admin(deps.storage, &role, &role)?);

    HANDLERS.save(
        deps.storage,
        &handler,
        &HandlerConfig {
            transceivers: vec![],
            threshold: 1,
        },
    )?;
    HANDLER_BY_UNIVERSAL.save(deps.storage, &universal_address(&handler), &handler)?;

    events.push(
        LogBuilder::new(&MESSAGE_HANDLER_ADDED)
            .string(handler.as_str())
            .string(admin.as_str())
            .build()?,
    );

    Ok(Response::new()
        .add_events(events)
        .add_attribute("method", "add_message_handler")
        .add_attribute("handler", handler)
        .add_attribute("added", "true"))
}

pub fn execute_add_transceiver(
    deps: DepsMut,
    info: MessageInfo,
    handler: String,
    transceiver: String,
) -> Result<Response, ContractError> {
    let handler = deps.api.addr_validate(&handler)?;
    let transceiver = deps.api.addr_validate(&transceiver)?;
    let mut config = load_handler(deps.storage, &handler)?;
    check_role(deps.storage, &message_handler_admin_role(&handler), &info.sender)?;

    if config.transceivers.len() >= MAX_TRANSCEIVERS {
        return Err(ContractError::MaxTransceiversExceeded);
    }
    if config.transceivers.contains(&transceiver) {
        return Err(ContractError::TransceiverAlreadyAdded);
    }
    config.transceivers.push(transceiver.clone());
    HANDLERS.save(deps.storage, &handler, &config)?;

    let event = LogBuilder::new(&TRANSCEIVER_ADDED)
        .string(handler.as_str())
        .string(transceiver.as_str())
        .build()?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "add_transceiver")
        .add_attribute("handler", handler)
        .add_attribute("transceiver", transceiver))
}

pub fn execute_remove_transceiver(
    deps: DepsMut,
    info: MessageInfo,
    handler: String,
    transceiver: String,
) -> Result<Response, ContractError> {
    let handler = deps.api.addr_validate(&handler)?;
    let transceiver = deps.api.addr_validate(&transceiver)?;
    let mut config = load_handler(deps.storage, &handler)?;
    check_role(deps.storage, &message_handler_admin_role(&handler), &info.sender)?;

    let before = config.transceivers.len();
    config.transceivers.retain(|t| *t != transceiver);
    if config.transceivers.len() == before {
        return Err(ContractError::TransceiverNotAdded);
    }
    HANDLERS.save(deps.storage, &handler, &config)?;

    let event = LogBuilder::new(&TRANSCEIVER_REMOVED)
        .string(handler.as_str())
        .string(transceiver.as_str())
        .build()?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "remove_transceiver")
        .add_attribute("handler", handler)
        .add_attribute("transceiver", transceiver))
}

pub fn execute_set_threshold(
    deps: DepsMut,
    info: MessageInfo,
    handler: String,
    threshold: u64,
) -> Result<Response, ContractError> {
    let handler = deps.api.addr_validate(&handler)?;
    let mut config = load_handler(deps.storage, &handler)?;
    if info.sender != handler {
        check_role(deps.storage, &message_handler_admin_role(&handler), &info.sender)?;
    }
    if threshold == 0 {
        return Err(ContractError::ZeroThreshold);
    }
    config.threshold = threshold;
    HANDLERS.save(deps.storage, &handler, &config)?;

    let event = LogBuilder::new(&THRESHOLD_UPDATED)
        .string(handler.as_str())
        .uint64(threshold)
        .build()?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "set_threshold")
        .add_attribute("handler", handler)
        .add_attribute("threshold", threshold.to_string()))
}
