//! Two-phase upgrade timelock
//!
//! A [`TimelockedValue`] holds the active value (phase 0) and a scheduled one
//! (phase 1). Phase 1 becomes effective once `now >= activation_timestamp`.
//! Scheduling requires `activation_timestamp >= now + active delay`, so a
//! change to the delay is itself subject to the current delay.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    to_json_binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult, Storage, WasmMsg,
};
use cw_storage_plus::Item;

use crate::access_control::{check_role, UPGRADABLE_ADMIN_ROLE};
use crate::error::ContractError;
use crate::events::{
    LogBuilder, MIN_UPGRADE_DELAY_UPDATED, UPGRADE_CANCELLED, UPGRADE_COMPLETED, UPGRADE_SCHEDULED,
};

/// Lower bound for the minimum upgrade delay at creation (one day)
pub const MIN_UPGRADE_DELAY: u64 = 86_400;

#[cw_serde]
pub struct TimelockedValue<T> {
    /// Effective before `activation_timestamp`
    pub value_0: T,
    /// Effective at and after `activation_timestamp`
    pub value_1: T,
    pub activation_timestamp: u64,
}

impl<T: Clone> TimelockedValue<T> {
    pub fn new(value: T) -> Self {
        Self {
            value_0: value.clone(),
            value_1: value,
            activation_timestamp: 0,
        }
    }

    pub fn active(&self, now: u64) -> &T {
        if now >= self.activation_timestamp {
            &self.value_1
        } else {
            &self.value_0
        }
    }

    /// Replace any pending value. The currently active value becomes phase 0.
    pub fn schedule(&mut self, now: u64, value: T, activation_timestamp: u64) {
        self.value_0 = self.active(now).clone();
        self.value_1 = value;
        self.activation_timestamp = activation_timestamp;
    }
}

/// Pending code migration
#[cw_serde]
pub struct ScheduledUpgrade {
    pub code_id: u64,
    pub activation_timestamp: u64,
}

// ============================================================================
// Storage
// ============================================================================

const MIN_UPGRADE_DELAY_VALUE: Item<TimelockedValue<u64>> = Item::new("tl_min_upgrade_delay");

const SCHEDULED_UPGRADE: Item<ScheduledUpgrade> = Item::new("tl_scheduled_upgrade");

/// Bumped on every completed migration
const VERSION: Item<u64> = Item::new("tl_version");

pub fn init_timelock(
    storage: &mut dyn Storage,
    min_upgrade_delay: u64,
) -> Result<(), ContractError> {
    if min_upgrade_delay < MIN_UPGRADE_DELAY {
        return Err(ContractError::UpgradeDelayTooShort {
            min: MIN_UPGRADE_DELAY,
        });
    }
    MIN_UPGRADE_DELAY_VALUE.save(storage, &TimelockedValue::new(min_upgrade_delay))?;
    VERSION.save(storage, &1)?;
    Ok(())
}

pub fn active_min_upgrade_delay(storage: &dyn Storage, now: u64) -> StdResult<u64> {
    Ok(*MIN_UPGRADE_DELAY_VALUE.load(storage)?.active(now))
}

/// Ensure `timestamp` respects the currently active delay
fn check_schedule_timestamp(
    storage: &dyn Storage,
    now: u64,
    timestamp: u64,
) -> Result<(), ContractError> {
    let earliest = now.saturating_add(active_min_upgrade_delay(storage, now)?);
    if timestamp < earliest {
        return Err(ContractError::TimestampTooEarly {
            requested: timestamp,
            earliest,
        });
    }
    Ok(())
}

// ============================================================================
// Execute Handlers
// ============================================================================

pub fn execute_update_min_upgrade_delay(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    delay: u64,
    timestamp: u64,
) -> Result<Response, ContractError> {
    check_role(deps.storage, &UPGRADABLE_ADMIN_ROLE, &info.sender)?;
    let now = env.block.time.seconds();
    check_schedule_timestamp(deps.storage, now, timestamp)?;

    let mut value = MIN_UPGRADE_DELAY_VALUE.load(deps.storage)?;
    value.schedule(now, delay, timestamp);
    MIN_UPGRADE_DELAY_VALUE.save(deps.storage, &value)?;

    let event = LogBuilder::new(&MIN_UPGRADE_DELAY_UPDATED)
        .uint64(delay)
        .uint64(timestamp)
        .build()?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "update_min_upgrade_delay")
        .add_attribute("delay", delay.to_string())
        .add_attribute("timestamp", timestamp.to_string()))
}

pub fn execute_schedule_contract_upgrade(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    code_id: u64,
    timestamp: u64,
) -> Result<Response, ContractError> {
    check_role(deps.storage, &UPGRADABLE_ADMIN_ROLE, &info.sender)?;
    check_schedule_timestamp(deps.storage, env.block.time.seconds(), timestamp)?;

    SCHEDULED_UPGRADE.save(
        deps.storage,
        &ScheduledUpgrade {
            code_id,
            activation_timestamp: timestamp,
        },
    )?;

    let event = LogBuilder::new(&UPGRADE_SCHEDULED)
        .uint64(code_id)
        .uint64(timestamp)
        .build()?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "schedule_contract_upgrade")
        .add_attribute("code_id", code_id.to_string())
        .add_attribute("timestamp", timestamp.to_string()))
}

pub fn execute_cancel_contract_upgrade(
    deps: DepsMut,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    check_role(deps.storage, &UPGRADABLE_ADMIN_ROLE, &info.sender)?;
    let scheduled = SCHEDULED_UPGRADE
        .may_load(deps.storage)?
        .ok_or(ContractError::NoScheduledUpgrade)?;
    SCHEDULED_UPGRADE.remove(deps.storage);

    let event = LogBuilder::new(&UPGRADE_CANCELLED)
        .uint64(scheduled.code_id)
        .build()?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "cancel_contract_upgrade")
        .add_attribute("code_id", scheduled.code_id.to_string()))
}

/// Dispatch the self-migration once the schedule is due. The contract must be
/// its own wasm admin for the migration to be accepted by the chain.
pub fn execute_complete_contract_upgrade<M: serde::Serialize>(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    migrate_msg: &M,
) -> Result<Response, ContractError> {
    check_role(deps.storage, &UPGRADABLE_ADMIN_ROLE, &info.sender)?;
    let scheduled = due_upgrade(deps.storage, env.block.time.seconds())?;

    Ok(Response::new()
        .add_message(WasmMsg::Migrate {
            contract_addr: env.contract.address.to_string(),
            new_code_id: scheduled.code_id,
            msg: to_json_binary(migrate_msg)?,
        })
        .add_attribute("method", "complete_contract_upgrade")
        .add_attribute("code_id", scheduled.code_id.to_string()))
}

/// Called from `migrate`: consume the due schedule and bump the version.
pub fn apply_scheduled_upgrade(
    storage: &mut dyn Storage,
    env: &Env,
) -> Result<Response, ContractError> {
    let scheduled = due_upgrade(storage, env.block.time.seconds())?;
    SCHEDULED_UPGRADE.remove(storage);
    let version = VERSION.may_load(storage)?.unwrap_or(1) + 1;
    VERSION.save(storage, &version)?;

    let event = LogBuilder::new(&UPGRADE_COMPLETED)
        .uint64(scheduled.code_id)
        .uint64(version)
        .build()?;
    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "migrate")
        .add_attribute("version", version.to_string()))
}

fn due_upgrade(storage: &dyn Storage, now: u64) -> Result<ScheduledUpgrade, ContractError> {
    let scheduled = SCHEDULED_UPGRADE
        .may_load(storage)?
        .ok_or(ContractError::NoScheduledUpgrade)?;
    if now < scheduled.activation_timestamp {
        return Err(ContractError::UpgradeNotReady {
            remaining_seconds: scheduled.activation_timestamp - now,
        });
    }
    Ok(scheduled)
}

// ============================================================================
// Queries
// ============================================================================

#[cw_serde]
pub struct MinUpgradeDelayResponse {
    pub active: u64,
    pub value: TimelockedValue<u64>,
}

#[cw_serde]
pub struct UpgradeStatusResponse {
    pub version: u64,
    pub scheduled: Option<ScheduledUpgrade>,
}

pub fn query_min_upgrade_delay(deps: Deps, env: Env) -> StdResult<MinUpgradeDelayResponse> {
    let value = MIN_UPGRADE_DELAY_VALUE.load(deps.storage)?;
    Ok(MinUpgradeDelayResponse {
        active: *value.active(env.block.time.seconds()),
        value,
    })
}

pub fn query_upgrade_status(deps: Deps) -> StdResult<UpgradeStatusResponse> {
    Ok(UpgradeStatusResponse {
        version: VERSION.may_load(deps.storage)?.unwrap_or(1),
        scheduled: SCHEDULED_UPGRADE.may_load(deps.storage)?,
    })
}
