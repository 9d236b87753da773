//! Outbound transfers: burn, rate limit, hand off to the transceiver manager.

use cosmwasm_std::{
    to_json_binary, Addr, BankMsg, Binary, Deps, DepsMut, Env, MessageInfo, Response, Storage,
    Uint128, WasmMsg,
};
use ntt_common::address::universal_address;
use ntt_common::codec::MessageToSend;
use ntt_common::events::{
    LogBuilder, OUTBOUND_TRANSFER_DELETED, OUTBOUND_TRANSFER_RATE_LIMITED, TRANSFER_SENT,
};
use ntt_common::fee::{check_fee_payment, fee_funds, FeePayment};
use ntt_common::hash::{bytes32_to_hex, message_id, parse_bytes32};
use ntt_common::initialisable::check_initialised;
use ntt_common::rate_limit::{
    backfill, bucket_id_inbound, bucket_id_outbound, consume, current_capacity, load_bucket,
};
use ntt_common::transceiver::{QuoteResponse, TransceiverInstruction};
use ntt_common::trimmed_amount::{trim_exact, untrim, TrimmedAmount};
use ntt_common::ContractError;
use ntt_token::msg::ExecuteMsg as TokenMsg;
use transceiver_manager::msg::{
    ExecuteMsg as TransceiverManagerMsg, QueryMsg as TransceiverManagerQuery,
};

use super::admin::check_not_paused;
use super::peers::load_peer;
use crate::payload::NativeTokenTransfer;
use crate::state::{
    Config, OutboundQueuedTransfer, CONFIG, MESSAGE_SEQUENCE, OUTBOUND_QUEUED_TRANSFERS,
};

// ============================================================================
// Helpers
// ============================================================================

/// Hand out the id for the next outbound message
pub(crate) fn next_message_id(storage: &mut dyn Storage) -> Result<[u8; 32], ContractError> {
    let sequence = MESSAGE_SEQUENCE.load(storage)?;
    let id = message_id(sequence)?;
    let next = sequence.checked_add(1).ok_or(ContractError::SequenceExhausted)?;
    MESSAGE_SEQUENCE.save(storage, &next)?;
    Ok(id)
}

pub(crate) fn burn_from_msg(
    token: &Addr,
    owner: &Addr,
    amount: Uint128,
) -> Result<WasmMsg, ContractError> {
    Ok(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(&TokenMsg::BurnFrom {
            owner: owner.to_string(),
            amount,
        })?,
        funds: vec![],
    })
}

pub(crate) fn mint_msg(
    token: &Addr,
    recipient: &Addr,
    amount: Uint128,
) -> Result<WasmMsg, ContractError> {
    Ok(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(&TokenMsg::Mint {
            recipient: recipient.to_string(),
            amount,
        })?,
        funds: vec![],
    })
}

/// A transfer ready to leave the chain
pub(crate) struct OutboundTransfer {
    pub message_id: [u8; 32],
    pub amount: TrimmedAmount,
    pub recipient_chain: u16,
    pub recipient: [u8; 32],
    pub sender: Addr,
    pub transceiver_instructions: Vec<TransceiverInstruction>,
}

/// Envelope for `transfer` as the remote peer will receive it
pub(crate) fn build_message(
    deps: Deps,
    env: &Env,
    config: &Config,
    transfer: &OutboundTransfer,
) -> Result<MessageToSend, ContractError> {
    let peer = load_peer(deps.storage, transfer.recipient_chain)?;
    let payload = NativeTokenTransfer {
        amount: transfer.amount,
        source_token: universal_address(&config.token),
        recipient: transfer.recipient,
        recipient_chain: transfer.recipient_chain,
    };
    Ok(MessageToSend {
        id: transfer.message_id,
        user_address: universal_address(&transfer.sender),
        source_address: universal_address(&env.contract.address),
        destination_chain_id: transfer.recipient_chain,
        handler_address: parse_bytes32(&peer.peer_contract)?,
        payload: payload.encode(),
    })
}

pub(crate) fn quote_message(
    deps: Deps,
    env: &Env,
    config: &Config,
    message: &Binary,
    transceiver_instructions: &[TransceiverInstruction],
) -> Result<Uint128, ContractError> {
    let quote: QuoteResponse = deps.querier.query_wasm_smart(
        &config.transceiver_manager,
        &TransceiverManagerQuery::QuoteDeliveryPrices {
            handler: env.contract.address.to_string(),
            message: message.clone(),
            transceiver_instructions: transceiver_instructions.to_vec(),
        },
    )?;
    Ok(quote.price)
}

/// Quote, check the caller's fee and forward the message with the fee to
/// the transceiver manager.
fn send_transfer(
    deps: Deps,
    env: &Env,
    info: &MessageInfo,
    fee_payment: &FeePayment,
    transfer: OutboundTransfer,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let message = Binary::from(build_message(deps, env, &config, &transfer)?.encode()?);

    let price = quote_message(deps, env, &config, &message, &transfer.transceiver_instructions)?;
    check_fee_payment(env, info, fee_payment, &config.fee_denom, price)?;

    let send = WasmMsg::Execute {
        contract_addr: config.transceiver_manager.to_string(),
        msg: to_json_binary(&TransceiverManagerMsg::SendMessageToTransceivers {
            fee_payment: FeePayment::new(config.transceiver_manager.as_str(), price),
            message,
            transceiver_instructions: transfer.transceiver_instructions,
        })?,
        funds: fee_funds(price, &config.fee_denom),
    };

    let amount = untrim(transfer.amount, config.token_decimals)?;
    let event = LogBuilder::new(&TRANSFER_SENT)
        .byte32(&transfer.message_id)
        .byte32(&transfer.recipient)
        .uint16(transfer.recipient_chain)
        .uint128(amount.u128())
        .uint128(price.u128())
        .build()?;

    Ok(Response::new()
        .add_message(send)
        .add_event(event)
        .add_attribute("message_id", bytes32_to_hex(&transfer.message_id))
        .add_attribute("fee", price))
}

// ============================================================================
// Transfer
// ============================================================================

#[allow(clippy::too_many_arguments)]
pub fn execute_transfer(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    fee_payment: FeePayment,
    amount: Uint128,
    recipient_chain: u16,
    recipient: Binary,
    should_queue: bool,
    transceiver_instructions: Vec<TransceiverInstruction>,
) -> Result<Response, ContractError> {
    check_initialised(deps.storage)?;
    check_not_paused(deps.storage)?;

    if amount.is_zero() {
        return Err(ContractError::ZeroAmount);
    }
    let recipient: [u8; 32] = recipient
        .as_slice()
        .try_into()
        .map_err(|_| ContractError::InvalidRecipient)?;
    if recipient == [0u8; 32] {
        return Err(ContractError::InvalidRecipient);
    }

    let config = CONFIG.load(deps.storage)?;
    let peer = load_peer(deps.storage, recipient_chain)?;
    let trimmed = trim_exact(amount, config.token_decimals, peer.decimals)?;
    // capacity is accounted in local units, free of dust
    let amount = untrim(trimmed, config.token_decimals)?;

    let now = env.block.time.seconds();
    let id = next_message_id(deps.storage)?;
    let burn = burn_from_msg(&config.token, &info.sender, amount)?;

    let transfer = OutboundTransfer {
        message_id: id,
        amount: trimmed,
        recipient_chain,
        recipient,
        sender: info.sender.clone(),
        transceiver_instructions,
    };

    let outbound = bucket_id_outbound();
    let capacity = current_capacity(deps.storage, &outbound, now)?;
    if capacity < amount {
        if !should_queue {
            return Err(ContractError::InsufficientCapacity {
                capacity,
                requested: amount,
            });
        }
        return enqueue_transfer(
            deps,
            &env,
            &info,
            &config,
            &fee_payment,
            burn,
            transfer,
            capacity,
            amount,
        );
    }

    consume(deps.storage, &outbound, amount, now)?;
    backfill(deps.storage, &bucket_id_inbound(recipient_chain), amount, now)?;

    let response = send_transfer(deps.as_ref(), &env, &info, &fee_payment, transfer)?;
    Ok(Response::new()
        .add_message(burn)
        .add_submessages(response.messages)
        .add_events(response.events)
        .add_attribute("method", "transfer")
        .add_attribute("sender", info.sender)
        .add_attribute("amount", amount)
        .add_attributes(response.attributes))
}

#[allow(clippy::too_many_arguments)]
fn enqueue_transfer(
    deps: DepsMut,
    env: &Env,
    info: &MessageInfo,
    config: &Config,
    fee_payment: &FeePayment,
    burn: WasmMsg,
    transfer: OutboundTransfer,
    capacity: Uint128,
    amount: Uint128,
) -> Result<Response, ContractError> {
    // the fee is charged on completion, so whatever was attached goes back
    check_fee_payment(env, info, fee_payment, &config.fee_denom, fee_payment.amount)?;

    OUTBOUND_QUEUED_TRANSFERS.save(
        deps.storage,
        transfer.message_id.as_slice(),
        &OutboundQueuedTransfer {
            timestamp: env.block.time.seconds(),
            amount: transfer.amount,
            recipient_chain: transfer.recipient_chain,
            recipient: Binary::from(transfer.recipient.to_vec()),
            sender: transfer.sender.clone(),
            transceiver_instructions: transfer.transceiver_instructions,
        },
    )?;

    let event = LogBuilder::new(&OUTBOUND_TRANSFER_RATE_LIMITED)
        .string(transfer.sender.as_str())
        .byte32(&transfer.message_id)
        .uint128(capacity.u128())
        .uint128(amount.u128())
        .build()?;

    let mut response = Response::new().add_message(burn);
    if !fee_payment.amount.is_zero() {
        response = response.add_message(BankMsg::Send {
            to_address: info.sender.to_string(),
            amount: fee_funds(fee_payment.amount, &config.fee_denom),
        });
    }
    Ok(response
        .add_event(event)
        .add_attribute("method", "transfer")
        .add_attribute("sender", info.sender.as_str())
        .add_attribute("amount", amount)
        .add_attribute("message_id", bytes32_to_hex(&transfer.message_id))
        .add_attribute("queued", "true"))
}

// ============================================================================
// Queue
// ============================================================================

fn load_queued(
    storage: &dyn Storage,
    message_id: &Binary,
) -> Result<([u8; 32], OutboundQueuedTransfer), ContractError> {
    let id = parse_bytes32(message_id)?;
    let queued = OUTBOUND_QUEUED_TRANSFERS
        .may_load(storage, id.as_slice())?
        .ok_or(ContractError::OutboundQueuedTransferUnknown)?;
    Ok((id, queued))
}

/// Anyone may complete; the caller pays the delivery fee.
pub fn execute_complete_outbound_queued_transfer(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    fee_payment: FeePayment,
    message_id: Binary,
) -> Result<Response, ContractError> {
    check_initialised(deps.storage)?;
    check_not_paused(deps.storage)?;

    let (id, queued) = load_queued(deps.storage, &message_id)?;
    let duration = load_bucket(deps.storage, &bucket_id_outbound())?.duration;
    let elapsed = env.block.time.seconds().saturating_sub(queued.timestamp);
    if elapsed < duration {
        return Err(ContractError::OutboundQueuedTransferStillQueued {
            remaining_seconds: duration - elapsed,
        });
    }
    OUTBOUND_QUEUED_TRANSFERS.remove(deps.storage, id.as_slice());

    let recipient = parse_bytes32(&queued.recipient)?;
    let transfer = OutboundTransfer {
        message_id: id,
        amount: queued.amount,
        recipient_chain: queued.recipient_chain,
        recipient,
        sender: queued.sender,
        transceiver_instructions: queued.transceiver_instructions,
    };
    let deleted = LogBuilder::new(&OUTBOUND_TRANSFER_DELETED).byte32(&id).build()?;
    let response = send_transfer(deps.as_ref(), &env, &info, &fee_payment, transfer)?;

    Ok(response
        .add_event(deleted)
        .add_attribute("method", "complete_outbound_queued_transfer"))
}

pub fn execute_cancel_outbound_queued_transfer(
    deps: DepsMut,
    info: MessageInfo,
    message_id: Binary,
) -> Result<Response, ContractError> {
    check_initialised(deps.storage)?;
    check_not_paused(deps.storage)?;

    let (id, queued) = load_queued(deps.storage, &message_id)?;
    if queued.sender != info.sender {
        return Err(ContractError::OnlyOriginalSenderCanCancel);
    }
    OUTBOUND_QUEUED_TRANSFERS.remove(deps.storage, id.as_slice());

    let config = CONFIG.load(deps.storage)?;
    let amount = untrim(queued.amount, config.token_decimals)?;
    let event = LogBuilder::new(&OUTBOUND_TRANSFER_DELETED).byte32(&id).build()?;

    Ok(Response::new()
        .add_message(mint_msg(&config.token, &queued.sender, amount)?)
        .add_event(event)
        .add_attribute("method", "cancel_outbound_queued_transfer")
        .add_attribute("message_id", bytes32_to_hex(&id))
        .add_attribute("amount", amount))
}
