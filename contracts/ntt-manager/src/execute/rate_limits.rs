//! Rate-limit configuration (RATE_LIMITER_MANAGER).
//!
//! Inbound buckets exist once the chain's peer has been set; updating an
//! unknown bucket fails.

use cosmwasm_std::{DepsMut, Env, MessageInfo, Response, Storage, Uint128};
use ntt_common::access_control::{check_role, RATE_LIMITER_MANAGER_ROLE};
use ntt_common::hash::bytes32_to_hex;
use ntt_common::initialisable::check_initialised;
use ntt_common::rate_limit::{
    bucket_id_inbound, bucket_id_outbound, set_duration, set_limit, BucketId,
};
use ntt_common::ContractError;

fn check_rate_limiter_manager(
    storage: &dyn Storage,
    info: &MessageInfo,
) -> Result<(), ContractError> {
    check_initialised(storage)?;
    check_role(storage, &RATE_LIMITER_MANAGER_ROLE, &info.sender)
}

fn update_limit(
    deps: DepsMut,
    env: Env,
    method: &str,
    bucket_id: BucketId,
    limit: Uint128,
) -> Result<Response, ContractError> {
    let event = set_limit(deps.storage, &bucket_id, limit, env.block.time.seconds())?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", method)
        .add_attribute("bucket_id", bytes32_to_hex(&bucket_id))
        .add_attribute("limit", limit))
}

fn update_duration(
    deps: DepsMut,
    env: Env,
    method: &str,
    bucket_id: BucketId,
    duration: u64,
) -> Result<Response, ContractError> {
    let event = set_duration(deps.storage, &bucket_id, duration, env.block.time.seconds())?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", method)
        .add_attribute("bucket_id", bytes32_to_hex(&bucket_id))
        .add_attribute("duration", duration.to_string()))
}

pub fn execute_set_outbound_rate_limit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    limit: Uint128,
) -> Result<Response, ContractError> {
    check_rate_limiter_manager(deps.storage, &info)?;
    update_limit(deps, env, "set_outbound_rate_limit", bucket_id_outbound(), limit)
}

pub fn execute_set_outbound_rate_duration(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    duration: u64,
) -> Result<Response, ContractError> {
    check_rate_limiter_manager(deps.storage, &info)?;
    update_duration(deps, env, "set_outbound_rate_duration", bucket_id_outbound(), duration)
}

pub fn execute_set_inbound_rate_limit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    chain_id: u16,
    limit: Uint128,
) -> Result<Response, ContractError> {
    check_rate_limiter_manager(deps.storage, &info)?;
    update_limit(deps, env, "set_inbound_rate_limit", bucket_id_inbound(chain_id), limit)
}

pub fn execute_set_inbound_rate_duration(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    chain_id: u16,
    duration: u64,
) -> Result<Response, ContractError> {
    check_rate_limiter_manager(deps.storage, &info)?;
    update_duration(
        deps,
        env,
        "set_inbound_rate_duration",
        bucket_id_inbound(chain_id),
        duration,
    )
}
