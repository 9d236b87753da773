//! Inbound transfers delivered by the transceiver manager.

use cosmwasm_std::{Binary, DepsMut, Env, MessageInfo, Response};
use ntt_common::address::{recipient_from_bytes32, universal_address};
use ntt_common::codec::MessageReceived;
use ntt_common::events::{
    LogBuilder, INBOUND_TRANSFER_DELETED, INBOUND_TRANSFER_RATE_LIMITED, TRANSFER_REDEEMED,
};
use ntt_common::hash::{bytes32_to_hex, parse_bytes32};
use ntt_common::initialisable::check_initialised;
use ntt_common::rate_limit::{
    backfill, bucket_id_inbound, bucket_id_outbound, consume, current_capacity, load_bucket,
};
use ntt_common::trimmed_amount::untrim;
use ntt_common::ContractError;

use super::admin::check_not_paused;
use super::outbound::mint_msg;
use super::peers::load_peer;
use crate::payload::NativeTokenTransfer;
use crate::state::{InboundQueuedTransfer, CONFIG, INBOUND_QUEUED_TRANSFERS, MESSAGES_EXECUTED};

/// Redeem a transfer that reached its attestation threshold. The recipient
/// is minted to directly, or queued when the inbound bucket for the source
/// chain lacks capacity.
pub fn execute_handle_message(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    message: Binary,
) -> Result<Response, ContractError> {
    check_initialised(deps.storage)?;
    check_not_paused(deps.storage)?;

    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.transceiver_manager {
        return Err(ContractError::UnexpectedCaller {
            expected: config.transceiver_manager.to_string(),
        });
    }

    let received = MessageReceived::decode(&message)?;
    if received.handler_address != universal_address(&env.contract.address) {
        return Err(ContractError::MessageHandlerAddressMismatch);
    }

    let digest = received.digest();
    if MESSAGES_EXECUTED.has(deps.storage, digest.as_slice()) {
        return Err(ContractError::MessageAlreadyExecuted);
    }

    let peer = load_peer(deps.storage, received.source_chain_id)?;
    if peer.peer_contract.as_slice() != received.source_address.as_slice() {
        return Err(ContractError::PeerAddressUnknown);
    }

    let transfer = NativeTokenTransfer::decode(&received.payload)?;
    if transfer.recipient_chain != config.chain_id {
        return Err(ContractError::InvalidTargetChain {
            chain_id: transfer.recipient_chain,
        });
    }
    let amount = untrim(transfer.amount, config.token_decimals)?;
    let recipient = recipient_from_bytes32(deps.api, &transfer.recipient, &config.bech32_prefix)?;

    MESSAGES_EXECUTED.save(deps.storage, digest.as_slice(), &true)?;
    let redeemed = LogBuilder::new(&TRANSFER_REDEEMED).byte32(&digest).build()?;

    let now = env.block.time.seconds();
    let inbound = bucket_id_inbound(received.source_chain_id);
    let capacity = current_capacity(deps.storage, &inbound, now)?;
    if capacity < amount {
        INBOUND_QUEUED_TRANSFERS.save(
            deps.storage,
            digest.as_slice(),
            &InboundQueuedTransfer {
                timestamp: now,
                amount: transfer.amount,
                source_chain: received.source_chain_id,
                recipient: recipient.clone(),
            },
        )?;
        let limited = LogBuilder::new(&INBOUND_TRANSFER_RATE_LIMITED)
            .string(recipient.as_str())
            .byte32(&digest)
            .uint128(capacity.u128())
            .uint128(amount.u128())
            .build()?;
        return Ok(Response::new()
            .add_event(redeemed)
            .add_event(limited)
            .add_attribute("method", "handle_message")
            .add_attribute("message_digest", bytes32_to_hex(&digest))
            .add_attribute("recipient", recipient)
            .add_attribute("amount", amount)
            .add_attribute("queued", "true"));
    }

    consume(deps.storage, &inbound, amount, now)?;
    backfill(deps.storage, &bucket_id_outbound(), amount, now)?;

    Ok(Response::new()
        .add_message(mint_msg(&config.token, &recipient, amount)?)
        .add_event(redeemed)
        .add_attribute("method", "handle_message")
        .add_attribute("message_digest", bytes32_to_hex(&digest))
        .add_attribute("source_chain", received.source_chain_id.to_string())
        .add_attribute("recipient", recipient)
        .add_attribute("amount", amount))
}

/// Anyone may complete once the inbound duration of the source chain elapsed.
pub fn execute_complete_inbound_queued_transfer(
    deps: DepsMut,
    env: Env,
    message_digest: Binary,
) -> Result<Response, ContractError> {
    check_initialised(deps.storage)?;
    check_not_paused(deps.storage)?;

    let digest = parse_bytes32(&message_digest)?;
    let queued = INBOUND_QUEUED_TRANSFERS
        .may_load(deps.storage, digest.as_slice())?
        .ok_or(ContractError::InboundQueuedTransferUnknown)?;

    let duration = load_bucket(deps.storage, &bucket_id_inbound(queued.source_chain))?.duration;
    let elapsed = env.block.time.seconds().saturating_sub(queued.timestamp);
    if elapsed < duration {
        return Err(ContractError::InboundQueuedTransferStillQueued {
            remaining_seconds: duration - elapsed,
        });
    }
    INBOUND_QUEUED_TRANSFERS.remove(deps.storage, digest.as_slice());

    let config = CONFIG.load(deps.storage)?;
    let amount = untrim(queued.amount, config.token_decimals)?;
    let event = LogBuilder::new(&INBOUND_TRANSFER_DELETED).byte32(&digest).build()?;

    Ok(Response::new()
        .add_message(mint_msg(&config.token, &queued.recipient, amount)?)
        .add_event(event)
        .add_attribute("method", "complete_inbound_queued_transfer")
        .add_attribute("message_digest", bytes32_to_hex(&digest))
        .add_attribute("recipient", queued.recipient)
        .add_attribute("amount", amount))
}
