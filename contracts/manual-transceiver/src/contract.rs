//! Manual Transceiver - Entry Points

use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdError,
    StdResult, Uint128,
};
use cw2::set_contract_version;
use ntt_common::access_control::{
    self, check_role, grant_role, RoleIdsResponse, DEFAULT_ADMIN_ROLE, RELAYER_ROLE,
    UPGRADABLE_ADMIN_ROLE,
};
use ntt_common::codec::{MessageReceived, MessageToSend};
use ntt_common::events::{LogBuilder, INTERNAL_QUOTE_DELIVERY_PRICE, INTERNAL_SEND_MESSAGE};
use ntt_common::initialisable::{check_initialised, is_initialised, mark_initialised, set_creator};
use ntt_common::timelock;
use ntt_common::transceiver::{
    deliver_message, execute_send_message, init_transceiver_base, query_quote_delivery_price,
    Transceiver, TransceiverBase,
};
use ntt_common::ContractError;

use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::state::{CONTRACT_NAME, CONTRACT_VERSION, MESSAGE_FEE};

pub struct ManualTransceiver;

impl Transceiver for ManualTransceiver {
    fn quote_delivery_price(
        &self,
        deps: Deps,
        _env: &Env,
        _message: &MessageToSend,
        _transceiver_instruction: &[u8],
    ) -> Result<Uint128, ContractError> {
        Ok(MESSAGE_FEE.load(deps.storage)?)
    }

    fn send_message(
        &self,
        deps: DepsMut,
        _env: &Env,
        total_fee: Uint128,
        message: &MessageToSend,
        transceiver_instruction: &[u8],
    ) -> Result<Response, ContractError> {
        check_initialised(deps.storage)?;

        let quoted = LogBuilder::new(&INTERNAL_QUOTE_DELIVERY_PRICE)
            .byte32(&message.id)
            .bytes(transceiver_instruction)
            .build()?;
        let sent = LogBuilder::new(&INTERNAL_SEND_MESSAGE)
            .uint128(total_fee.u128())
            .byte32(&message.id)
            .bytes(transceiver_instruction)
            .build()?;
        Ok(Response::new()
            .add_event(quoted)
            .add_event(sent)
            .add_attribute("method", "send_message")
            .add_attribute("destination_chain_id", message.destination_chain_id.to_string()))
    }
}

// ============================================================================
// Instantiate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let transceiver_manager = deps.api.addr_validate(&msg.transceiver_manager)?;
    init_transceiver_base(
        deps.storage,
        &TransceiverBase {
            transceiver_manager: transceiver_manager.clone(),
            fee_denom: msg.fee_denom,
        },
    )?;
    MESSAGE_FEE.save(deps.storage, &msg.message_fee)?;
    set_creator(deps.storage, &info.sender)?;
    timelock::init_timelock(deps.storage, msg.min_upgrade_delay)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("transceiver_manager", transceiver_manager)
        .add_attribute("message_fee", msg.message_fee))
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
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Initialise { admin } => execute_initialise(deps, info, admin),
        ExecuteMsg::SendMessage {
            fee_payment,
            message,
            transceiver_instruction,
        } => execute_send_message(
            &ManualTransceiver,
            deps,
            env,
            info,
            fee_payment,
            message,
            transceiver_instruction,
        ),
        ExecuteMsg::DeliverMessage { message } => execute_deliver_message(deps, info, message),
        ExecuteMsg::SetMessageFee { message_fee } => {
            execute_set_message_fee(deps, info, message_fee)
        }
        ExecuteMsg::GrantRole { role, account } => {
            access_control::execute_grant_role(deps, info, role, account)
        }
        ExecuteMsg::RevokeRole { role, account } => {
            access_control::execute_revoke_role(deps, info, role, account)
        }
        ExecuteMsg::RenounceRole { role } => {
            access_control::execute_renounce_role(deps, info, role)
        }
        ExecuteMsg::SetRoleAdmin { role, admin_role } => {
            access_control::execute_set_role_admin(deps, info, role, admin_role)
        }
        ExecuteMsg::UpdateMinUpgradeDelay { delay, timestamp } => {
            timelock::execute_update_min_upgrade_delay(deps, env, info, delay, timestamp)
        }
        ExecuteMsg::ScheduleContractUpgrade { code_id, timestamp } => {
            timelock::execute_schedule_contract_upgrade(deps, env, info, code_id, timestamp)
        }
        ExecuteMsg::CancelContractUpgrade {} => {
            timelock::execute_cancel_contract_upgrade(deps, info)
        }
        ExecuteMsg::CompleteContractUpgrade {} => {
            timelock::execute_complete_contract_upgrade(deps, env, info, &MigrateMsg {})
        }
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
    for role in [DEFAULT_ADMIN_ROLE, UPGRADABLE_ADMIN_ROLE, RELAYER_ROLE] {
        events.extend(grant_role(deps.storage, &role, &admin, &info.sender)?);
    }

    Ok(Response::new()
        .add_events(events)
        .add_attribute("method", "initialise")
        .add_attribute("admin", admin))
}

fn execute_deliver_message(
    deps: DepsMut,
    info: MessageInfo,
    message: Binary,
) -> Result<Response, ContractError> {
    check_initialised(deps.storage)?;
    check_role(deps.storage, &RELAYER_ROLE, &info.sender)?;

    let received = MessageReceived::decode(&message)?;
    let msg = deliver_message(deps.storage, &received)?;

    Ok(Response::new()
        .add_message(msg)
        .add_attribute("method", "deliver_message")
        .add_attribute("message_id", hex::encode(received.id))
        .add_attribute("source_chain_id", received.source_chain_id.to_string()))
}

fn execute_set_message_fee(
    deps: DepsMut,
    info: MessageInfo,
    message_fee: Uint128,
) -> Result<Response, ContractError> {
    check_initialised(deps.storage)?;
    check_role(deps.storage, &DEFAULT_ADMIN_ROLE, &info.sender)?;
    MESSAGE_FEE.save(deps.storage, &message_fee)?;

    Ok(Response::new()
        .add_attribute("method", "set_message_fee")
        .add_attribute("message_fee", message_fee))
}

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::QuoteDeliveryPrice {
            message,
            transceiver_instruction,
        } => {
            let quote = query_quote_delivery_price(
                &ManualTransceiver,
                deps,
                env,
                message,
                transceiver_instruction,
            )
            .map_err(|e| StdError::generic_err(e.to_string()))?;
            to_json_binary(&quote)
        }
        QueryMsg::MessageFee {} => to_json_binary(&MESSAGE_FEE.load(deps.storage)?),
        QueryMsg::TransceiverType {} => to_json_binary("manual"),
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
