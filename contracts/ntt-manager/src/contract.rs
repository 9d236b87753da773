//! NTT Manager - Entry Points

use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult,
};
use cw2::set_contract_version;
use cw20::TokenInfoResponse;
use ntt_common::access_control::{self, RoleIdsResponse};
use ntt_common::initialisable::{is_initialised, set_creator};
use ntt_common::rate_limit::{bucket_id_inbound, bucket_id_outbound};
use ntt_common::timelock;
use ntt_common::ContractError;
use ntt_token::msg::QueryMsg as TokenQuery;

use crate::execute::{
    execute_cancel_outbound_queued_transfer, execute_complete_inbound_queued_transfer,
    execute_complete_outbound_queued_transfer, execute_handle_message, execute_initialise,
    execute_pause, execute_set_inbound_rate_duration, execute_set_inbound_rate_limit,
    execute_set_ntt_manager_peer, execute_set_ntt_manager_peer_decimals,
    execute_set_outbound_rate_duration, execute_set_outbound_rate_limit, execute_set_threshold,
    execute_set_transceiver_manager, execute_transfer, execute_unpause,
};
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query::{
    query_config, query_current_inbound_capacity, query_current_outbound_capacity,
    query_inbound_queued_transfer, query_is_message_executed, query_message_sequence,
    query_ntt_manager_peer, query_outbound_queued_transfer, query_quote_delivery_price,
    query_rate_duration, query_rate_limit, query_rate_limit_bucket,
};
use crate::state::{Config, CONFIG, CONTRACT_NAME, CONTRACT_VERSION, MESSAGE_SEQUENCE, PAUSED};

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

    let token = deps.api.addr_validate(&msg.token)?;
    let transceiver_manager = deps.api.addr_validate(&msg.transceiver_manager)?;
    let token_info: TokenInfoResponse = deps
        .querier
        .query_wasm_smart(&token, &TokenQuery::TokenInfo {})?;

    CONFIG.save(
        deps.storage,
        &Config {
            token: token.clone(),
            token_decimals: token_info.decimals,
            transceiver_manager: transceiver_manager.clone(),
            chain_id: msg.chain_id,
            fee_denom: msg.fee_denom,
            bech32_prefix: msg.bech32_prefix,
        },
    )?;
    PAUSED.save(deps.storage, &false)?;
    MESSAGE_SEQUENCE.save(deps.storage, &0)?;
    set_creator(deps.storage, &info.sender)?;
    timelock::init_timelock(deps.storage, msg.min_upgrade_delay)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("token", token)
        .add_attribute("token_decimals", token_info.decimals.to_string())
        .add_attribute("transceiver_manager", transceiver_manager)
        .add_attribute("chain_id", msg.chain_id.to_string()))
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
        // Setup
        ExecuteMsg::Initialise { admin } => execute_initialise(deps, env, info, admin),
        ExecuteMsg::Pause {} => execute_pause(deps, info),
        ExecuteMsg::Unpause {} => execute_unpause(deps, info),
        ExecuteMsg::SetTransceiverManager {
            admin,
            transceiver_manager,
        } => execute_set_transceiver_manager(deps, info, admin, transceiver_manager),
        ExecuteMsg::SetThreshold { threshold } => execute_set_threshold(deps, env, info, threshold),

        // Peers
        ExecuteMsg::SetNttManagerPeer {
            chain_id,
            peer_contract,
            decimals,
        } => execute_set_ntt_manager_peer(deps, env, info, chain_id, peer_contract, decimals),
        ExecuteMsg::SetNttManagerPeerDecimals { chain_id, decimals } => {
            execute_set_ntt_manager_peer_decimals(deps, info, chain_id, decimals)
        }

        // Rate limits
        ExecuteMsg::SetOutboundRateLimit { limit } => {
            execute_set_outbound_rate_limit(deps, env, info, limit)
        }
        ExecuteMsg::SetOutboundRateDuration { duration } => {
            execute_set_outbound_rate_duration(deps, env, info, duration)
        }
        ExecuteMsg::SetInboundRateLimit { chain_id, limit } => {
            execute_set_inbound_rate_limit(deps, env, info, chain_id, limit)
        }
        ExecuteMsg::SetInboundRateDuration { chain_id, duration } => {
            execute_set_inbound_rate_duration(deps, env, info, chain_id, duration)
        }

        // Transfers
        ExecuteMsg::Transfer {
            fee_payment,
            amount,
            recipient_chain,
            recipient,
            should_queue,
            transceiver_instructions,
        } => execute_transfer(
            deps,
            env,
            info,
            fee_payment,
            amount,
            recipient_chain,
            recipient,
            should_queue,
            transceiver_instructions,
        ),
        ExecuteMsg::CompleteOutboundQueuedTransfer {
            fee_payment,
            message_id,
        } => execute_complete_outbound_queued_transfer(deps, env, info, fee_payment, message_id),
        ExecuteMsg::CancelOutboundQueuedTransfer { message_id } => {
            execute_cancel_outbound_queued_transfer(deps, info, message_id)
        }
        ExecuteMsg::CompleteInboundQueuedTransfer { message_digest } => {
            execute_complete_inbound_queued_transfer(deps, env, message_digest)
        }
        ExecuteMsg::HandleMessage { message } => execute_handle_message(deps, env, info, message),

        // Access control
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

        // Upgrades
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

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::IsPaused {} => to_json_binary(&PAUSED.load(deps.storage)?),
        QueryMsg::NttManagerPeer { chain_id } => {
            to_json_binary(&query_ntt_manager_peer(deps, chain_id)?)
        }
        QueryMsg::QuoteDeliveryPrice {
            recipient_chain,
            transceiver_instructions,
        } => to_json_binary(&query_quote_delivery_price(
            deps,
            env,
            recipient_chain,
            transceiver_instructions,
        )?),
        QueryMsg::OutboundBucketId {} => {
            to_json_binary(&Binary::from(bucket_id_outbound().to_vec()))
        }
        QueryMsg::InboundBucketId { chain_id } => {
            to_json_binary(&Binary::from(bucket_id_inbound(chain_id).to_vec()))
        }
        QueryMsg::RateLimitBucket { bucket_id } => {
            to_json_binary(&query_rate_limit_bucket(deps, bucket_id)?)
        }
        QueryMsg::RateLimit { bucket_id } => to_json_binary(&query_rate_limit(deps, bucket_id)?),
        QueryMsg::RateDuration { bucket_id } => {
            to_json_binary(&query_rate_duration(deps, bucket_id)?)
        }
        QueryMsg::CurrentOutboundCapacity {} => {
            to_json_binary(&query_current_outbound_capacity(deps, env)?)
        }
        QueryMsg::CurrentInboundCapacity { chain_id } => {
            to_json_binary(&query_current_inbound_capacity(deps, env, chain_id)?)
        }
        QueryMsg::OutboundQueuedTransfer { message_id } => {
            to_json_binary(&query_outbound_queued_transfer(deps, env, message_id)?)
        }
        QueryMsg::InboundQueuedTransfer { message_digest } => {
            to_json_binary(&query_inbound_queued_transfer(deps, env, message_digest)?)
        }
        QueryMsg::IsMessageExecuted { message_digest } => {
            to_json_binary(&query_is_message_executed(deps, message_digest)?)
        }
        QueryMsg::MessageSequence {} => to_json_binary(&query_message_sequence(deps)?),
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
