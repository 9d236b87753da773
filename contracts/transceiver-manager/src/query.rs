//! Query handlers for the transceiver manager.

use cosmwasm_std::{Binary, Deps, StdError, StdResult, Uint128};
use ntt_common::access_control::message_handler_admin_role;
use ntt_common::codec::{MessageReceived, MessageToSend};
use ntt_common::hash::parse_bytes32;
use ntt_common::transceiver::{QuoteResponse, TransceiverInstruction};
use ntt_common::ContractError;

use crate::execute::{load_handler, quote_transceivers};
use crate::msg::{ConfigResponse, HandlerTransceiversResponse};
use crate::state::{
    AttestationRecord, ATTESTATIONS, CONFIG, HANDLERS, NUM_ATTESTATIONS, TRANSCEIVER_ATTESTATIONS,
};

fn std_err(err: ContractError) -> StdError {
    StdError::generic_err(err.to_string())
}

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        fee_denom: config.fee_denom,
    })
}

pub fn query_is_message_handler_known(deps: Deps, handler: String) -> StdResult<bool> {
    let handler = deps.api.addr_validate(&handler)?;
    Ok(HANDLERS.has(deps.storage, &handler))
}

pub fn query_handler_transceivers(
    deps: Deps,
    handler: String,
) -> StdResult<HandlerTransceiversResponse> {
    let handler = deps.api.addr_validate(&handler)?;
    let config = load_handler(deps.storage, &handler).map_err(std_err)?;
    Ok(HandlerTransceiversResponse {
        transceivers: config.transceivers,
        threshold: config.threshold,
    })
}

pub fn query_is_transceiver_configured(
    deps: Deps,
    handler: String,
    transceiver: String,
) -> StdResult<bool> {
    let handler = deps.api.addr_validate(&handler)?;
    let transceiver = deps.api.addr_validate(&transceiver)?;
    let config = load_handler(deps.storage, &handler).map_err(std_err)?;
    Ok(config.transceivers.contains(&transceiver))
}

pub fn query_threshold(deps: Deps, handler: String) -> StdResult<u64> {
    let handler = deps.api.addr_validate(&handler)?;
    Ok(load_handler(deps.storage, &handler).map_err(std_err)?.threshold)
}

pub fn query_quote_delivery_prices(
    deps: Deps,
    handler: String,
    message: Binary,
    transceiver_instructions: Vec<TransceiverInstruction>,
) -> StdResult<QuoteResponse> {
    let handler = deps.api.addr_validate(&handler)?;
    let config = load_handler(deps.storage, &handler).map_err(std_err)?;
    MessageToSend::decode(&message).map_err(std_err)?;

    let quotes = quote_transceivers(
        &deps.querier,
        &config.transceivers,
        &message,
        &transceiver_instructions,
    )
    .map_err(std_err)?;
    let price: Uint128 = quotes.iter().map(|q| q.price).sum();
    Ok(QuoteResponse { price })
}

pub fn query_message_attestations(deps: Deps, message_digest: Binary) -> StdResult<u64> {
    let digest = parse_bytes32(&message_digest).map_err(std_err)?;
    Ok(NUM_ATTESTATIONS
        .may_load(deps.storage, digest.as_slice())?
        .unwrap_or(0))
}

pub fn query_has_transceiver_attested(
    deps: Deps,
    message_digest: Binary,
    transceiver: String,
) -> StdResult<bool> {
    let digest = parse_bytes32(&message_digest).map_err(std_err)?;
    let transceiver = deps.api.addr_validate(&transceiver)?;
    Ok(TRANSCEIVER_ATTESTATIONS
        .may_load(deps.storage, (digest.as_slice(), &transceiver))?
        .unwrap_or(false))
}

pub fn query_attestation(
    deps: Deps,
    handler: String,
    source_chain_id: u16,
    message_id: Binary,
) -> StdResult<Option<AttestationRecord>> {
    let handler = deps.api.addr_validate(&handler)?;
    let id = parse_bytes32(&message_id).map_err(std_err)?;
    ATTESTATIONS.may_load(deps.storage, (&handler, source_chain_id, id.as_slice()))
}

pub fn query_calculate_message_digest(message: Binary) -> StdResult<Binary> {
    let message = MessageReceived::decode(&message).map_err(std_err)?;
    Ok(Binary::from(message.digest().to_vec()))
}

pub fn query_message_handler_admin_role(deps: Deps, handler: String) -> StdResult<Binary> {
    let handler = deps.api.addr_validate(&handler)?;
    Ok(Binary::from(message_handler_admin_role(&handler).to_vec()))
}
