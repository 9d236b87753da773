//! Transceiver Manager - Entry Points

use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult,
};
use cw2::set_contract_version;
use ntt_common::access_control::{self, grant_role, DEFAULT_ADMIN_ROLE};
use ntt_common::ContractError;

use crate::execute::{
    execute_add_message_handler, execute_add_transceiver, execute_attestation_received,
    execute_remove_transceiver, execute_send_message_to_transceivers, execute_set_threshold,
};
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query::{
    query_attestation, query_calculate_message_digest, query_config, query_handler_transceivers,
    query_has_transceiver_attested, query_is_message_handler_known,
    query_is_transceiver_configured, query_message_attestations,
    query_message_handler_admin_role, query_quote_delivery_prices, query_threshold,
};
use crate::state::{Config, CONFIG, CONTRACT_NAME, CONTRACT_VERSION};

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

    let admin = deps.api.addr_validate(&msg.admin)?;
    CONFIG.save(
        deps.storage,
        &Config {
            fee_denom: msg.fee_denom.clone(),
        },
    )?;
    let event = grant_role(deps.storage, &DEFAULT_ADMIN_ROLE, &admin, &info.sender)?;

    Ok(Response::new()
        .add_events(event)
        .add_attribute("method", "instantiate")
        .add_attribute("admin", admin)
        .add_attribute("fee_denom", msg.fee_denom))
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
        ExecuteMsg::AddMessageHandler { admin } => execute_add_message_handler(deps, info, admin),
        ExecuteMsg::AddTransceiver {
            handler,
            transceiver,
        } => execute_add_transceiver(deps, info, handler, transceiver),
        ExecuteMsg::RemoveTransceiver {
            handler,
            transceiver,
        } => execute_remove_transceiver(deps, info, handler, transceiver),
        ExecuteMsg::SetThreshold { handler, threshold } => {
            execute_set_threshold(deps, info, handler, threshold)
        }
        ExecuteMsg::SendMessageToTransceivers {
            fee_payment,
            message,
            transceiver_instructions,
        } => execute_send_message_to_transceivers(
            deps,
            env,
            info,
            fee_payment,
            message,
            transceiver_instructions,
        ),
        ExecuteMsg::AttestationReceived { message } => {
            execute_attestation_received(deps, info, message)
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
    }
}

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::IsMessageHandlerKnown { handler } => {
            to_json_binary(&query_is_message_handler_known(deps, handler)?)
        }
        QueryMsg::HandlerTransceivers { handler } => {
            to_json_binary(&query_handler_transceivers(deps, handler)?)
        }
        QueryMsg::IsTransceiverConfigured {
            handler,
            transceiver,
        } => to_json_binary(&query_is_transceiver_configured(deps, handler, transceiver)?),
        QueryMsg::Threshold { handler } => to_json_binary(&query_threshold(deps, handler)?),
        QueryMsg::QuoteDeliveryPrices {
            handler,
            message,
            transceiver_instructions,
        } => to_json_binary(&query_quote_delivery_prices(
            deps,
            handler,
            message,
            transceiver_instructions,
        )?),
        QueryMsg::MessageAttestations { message_digest } => {
            to_json_binary(&query_message_attestations(deps, message_digest)?)
        }
        QueryMsg::HasTransceiverAttested {
            message_digest,
            transceiver,
        } => to_json_binary(&query_has_transceiver_attested(
            deps,
            message_digest,
            transceiver,
        )?),
        QueryMsg::Attestation {
            handler,
            source_chain_id,
            message_id,
        } => to_json_binary(&query_attestation(deps, handler, source_chain_id, message_id)?),
        QueryMsg::CalculateMessageDigest { message } => {
            to_json_binary(&query_calculate_message_digest(message)?)
        }
        QueryMsg::MessageHandlerAdminRole { handler } => {
            to_json_binary(&query_message_handler_admin_role(deps, handler)?)
        }
        QueryMsg::HasRole { role, account } => {
            to_json_binary(&access_control::query_has_role(deps, role, account)?)
        }
        QueryMsg::RoleAdmin { role } => {
            to_json_binary(&access_control::query_role_admin(deps, role)?)
        }
    }
}

// ============================================================================
// Migrate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::new().add_attribute("method", "migrate"))
}
