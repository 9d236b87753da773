//! Query handlers for the NTT manager.

use cosmwasm_std::{Binary, Deps, Env, StdError, StdResult, Uint128};
use ntt_common::hash::{message_id, parse_bytes32};
use ntt_common::rate_limit::{
    bucket_id_inbound, bucket_id_outbound, current_capacity, load_bucket, may_load_bucket,
    RateLimitBucket,
};
use ntt_common::transceiver::{QuoteResponse, TransceiverInstruction};
use ntt_common::trimmed_amount::{TrimmedAmount, TRIMMED_DECIMALS};
use ntt_common::ContractError;

use crate::execute::{build_message, load_peer, quote_message, OutboundTransfer};
use crate::msg::{ConfigResponse, InboundQueuedTransferResponse, OutboundQueuedTransferResponse};
use crate::state::{
    NttManagerPeer, CONFIG, INBOUND_QUEUED_TRANSFERS, MESSAGES_EXECUTED, MESSAGE_SEQUENCE,
    NTT_MANAGER_PEERS, OUTBOUND_QUEUED_TRANSFERS,
};

fn std_err(err: ContractError) -> StdError {
    StdError::generic_err(err.to_string())
}

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        token: config.token,
        token_decimals: config.token_decimals,
        transceiver_manager: config.transceiver_manager,
        chain_id: config.chain_id,
        fee_denom: config.fee_denom,
        bech32_prefix: config.bech32_prefix,
    })
}

pub fn query_ntt_manager_peer(deps: Deps, chain_id: u16) -> StdResult<Option<NttManagerPeer>> {
    NTT_MANAGER_PEERS.may_load(deps.storage, chain_id)
}

/// Quote a transfer as it would be sent next. The price does not depend on
/// amount or recipient.
pub fn query_quote_delivery_price(
    deps: Deps,
    env: Env,
    recipient_chain: u16,
    transceiver_instructions: Vec<TransceiverInstruction>,
) -> StdResult<QuoteResponse> {
    let config = CONFIG.load(deps.storage)?;
    let peer = load_peer(deps.storage, recipient_chain).map_err(std_err)?;
    let sequence = MESSAGE_SEQUENCE.load(deps.storage)?;

    let transfer = OutboundTransfer {
        message_id: message_id(sequence).map_err(std_err)?,
        amount: TrimmedAmount {
            amount: 0,
            decimals: TRIMMED_DECIMALS.min(config.token_decimals).min(peer.decimals),
        },
        recipient_chain,
        recipient: [0u8; 32],
        sender: env.contract.address.clone(),
        transceiver_instructions,
    };
    let message = build_message(deps, &env, &config, &transfer).map_err(std_err)?;
    let message = Binary::from(message.encode().map_err(std_err)?);
    let price = quote_message(deps, &env, &config, &message, &transfer.transceiver_instructions)
        .map_err(std_err)?;
    Ok(QuoteResponse { price })
}

// ============================================================================
// Rate Limits
// ============================================================================

pub fn query_rate_limit_bucket(
    deps: Deps,
    bucket_id: Binary,
) -> StdResult<Option<RateLimitBucket>> {
    let bucket_id = parse_bytes32(&bucket_id).map_err(std_err)?;
    may_load_bucket(deps.storage, &bucket_id)
}

fn load_bucket_by_id(deps: Deps, bucket_id: &Binary) -> StdResult<RateLimitBucket> {
    let bucket_id = parse_bytes32(bucket_id).map_err(std_err)?;
    load_bucket(deps.storage, &bucket_id).map_err(std_err)
}

pub fn query_rate_limit(deps: Deps, bucket_id: Binary) -> StdResult<Uint128> {
    Ok(load_bucket_by_id(deps, &bucket_id)?.limit)
}

pub fn query_rate_duration(deps: Deps, bucket_id: Binary) -> StdResult<u64> {
    Ok(load_bucket_by_id(deps, &bucket_id)?.duration)
}

pub fn query_current_outbound_capacity(deps: Deps, env: Env) -> StdResult<Uint128> {
    current_capacity(deps.storage, &bucket_id_outbound(), env.block.time.seconds())
        .map_err(std_err)
}

pub fn query_current_inbound_capacity(deps: Deps, env: Env, chain_id: u16) -> StdResult<Uint128> {
    current_capacity(
        deps.storage,
        &bucket_id_inbound(chain_id),
        env.block.time.seconds(),
    )
    .map_err(std_err)
}

fn duration_elapsed(
    deps: Deps,
    env: &Env,
    bucket_id: &[u8; 32],
    timestamp: u64,
) -> StdResult<bool> {
    let duration = load_bucket(deps.storage, bucket_id).map_err(std_err)?.duration;
    Ok(env.block.time.seconds().saturating_sub(timestamp) >= duration)
}

pub fn query_outbound_queued_transfer(
    deps: Deps,
    env: Env,
    message_id: Binary,
) -> StdResult<OutboundQueuedTransferResponse> {
    let id = parse_bytes32(&message_id).map_err(std_err)?;
    let transfer = OUTBOUND_QUEUED_TRANSFERS
        .may_load(deps.storage, id.as_slice())?
        .ok_or_else(|| std_err(ContractError::OutboundQueuedTransferUnknown))?;
    Ok(OutboundQueuedTransferResponse {
        can_complete: duration_elapsed(deps, &env, &bucket_id_outbound(), transfer.timestamp)?,
        transfer,
    })
}

pub fn query_inbound_queued_transfer(
    deps: Deps,
    env: Env,
    message_digest: Binary,
) -> StdResult<InboundQueuedTransferResponse> {
    let digest = parse_bytes32(&message_digest).map_err(std_err)?;
    let transfer = INBOUND_QUEUED_TRANSFERS
        .may_load(deps.storage, digest.as_slice())?
        .ok_or_else(|| std_err(ContractError::InboundQueuedTransferUnknown))?;
    Ok(InboundQueuedTransferResponse {
        can_complete: duration_elapsed(
            deps,
            &env,
            &bucket_id_inbound(transfer.source_chain),
            transfer.timestamp,
        )?,
        transfer,
    })
}

// ============================================================================
// Messages
// ============================================================================

pub fn query_is_message_executed(deps: Deps, message_digest: Binary) -> StdResult<bool> {
    let digest = parse_bytes32(&message_digest).map_err(std_err)?;
    Ok(MESSAGES_EXECUTED.has(deps.storage, digest.as_slice()))
}

pub fn query_message_sequence(deps: Deps) -> StdResult<u64> {
    MESSAGE_SEQUENCE.load(deps.storage)
}
