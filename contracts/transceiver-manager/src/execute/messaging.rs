//! Outbound fan-out and inbound attestation.

use cosmwasm_std::{
    to_json_binary, Addr, Binary, DepsMut, Env, MessageInfo, QuerierWrapper, Response, Uint128,
    WasmMsg,
};
use ntt_common::address::universal_address;
use ntt_common::codec::{MessageReceived, MessageToSend};
use ntt_common::events::{
    LogBuilder, ATTESTATION_RECEIVED, MESSAGE_EXECUTED, MESSAGE_SENT_TO_TRANSCEIVER,
};
use ntt_common::fee::{check_fee_payment, fee_funds, FeePayment};
use ntt_common::hash::bytes32_to_hex;
use ntt_common::transceiver::{
    MessageHandlerExecuteMsg, QuoteResponse, TransceiverExecuteMsg, TransceiverInstruction,
    TransceiverQueryMsg,
};
use ntt_common::ContractError;

use super::handlers::load_handler;
use crate::state::{
    AttestationRecord, ATTESTATIONS, CONFIG, HANDLER_BY_UNIVERSAL, NUM_ATTESTATIONS,
    TRANSCEIVER_ATTESTATIONS,
};

pub(crate) struct Quote {
    pub transceiver: Addr,
    pub instruction: Binary,
    pub price: Uint128,
}

/// Quote every transceiver in configured order, pairing each with its
/// instruction. Instructions must be a subsequence of the configured order
/// and must all be consumed.
pub(crate) fn quote_transceivers(
    querier: &QuerierWrapper,
    transceivers: &[Addr],
    message: &Binary,
    instructions: &[TransceiverInstruction],
) -> Result<Vec<Quote>, ContractError> {
    if transceivers.is_empty() {
        return Err(ContractError::NoTransceivers);
    }

    let mut next = 0usize;
    let mut quotes = Vec::with_capacity(transceivers.len());
    for transceiver in transceivers {
        let instruction = match instructions.get(next) {
            Some(i) if i.transceiver == transceiver.as_str() => {
                next += 1;
                i.instruction.clone()
            }
            _ => Binary::default(),
        };
        let quote: QuoteResponse = querier.query_wasm_smart(
            transceiver,
            &TransceiverQueryMsg::QuoteDeliveryPrice {
                message: message.clone(),
                transceiver_instruction: instruction.clone(),
            },
        )?;
        quotes.push(Quote {
            transceiver: transceiver.clone(),
            instruction,
            price: quote.price,
        });
    }

    if next != instructions.len() {
        return Err(ContractError::InvalidInstructions);
    }
    Ok(quotes)
}

pub fn execute_send_message_to_transceivers(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    fee_payment: FeePayment,
    message: Binary,
    transceiver_instructions: Vec<TransceiverInstruction>,
) -> Result<Response, ContractError> {
    let handler = info.sender.clone();
    let config = load_handler(deps.storage, &handler)?;

    let decoded = MessageToSend::decode(&message)?;
    if decoded.source_address != universal_address(&handler) {
        return Err(ContractError::UnexpectedSourceAddress);
    }

    let quotes = quote_transceivers(
        &deps.querier,
        &config.transceivers,
        &message,
        &transceiver_instructions,
    )?;
    let total: Uint128 = quotes.iter().map(|q| q.price).sum();
    let fee_denom = CONFIG.load(deps.storage)?.fee_denom;
    check_fee_payment(&env, &info, &fee_payment, &fee_denom, total)?;

    let mut response = Response::new();
    for quote in quotes {
        response = response
            .add_message(WasmMsg::Execute {
                contract_addr: quote.transceiver.to_string(),
                msg: to_json_binary(&TransceiverExecuteMsg::SendMessage {
                    fee_payment: FeePayment::new(quote.transceiver.as_str(), quote.price),
                    message: message.clone(),
                    transceiver_instruction: quote.instruction,
                })?,
                funds: fee_funds(quote.price, &fee_denom),
            })
            .add_event(
                LogBuilder::new(&MESSAGE_SENT_TO_TRANSCEIVER)
                    .string(handler.as_str())
                    .string(quote.transceiver.as_str())
                    .byte32(&decoded.id)
                    .build()?,
            );
    }

    Ok(response
        .add_attribute("method", "send_message_to_transceivers")
        .add_attribute("handler", handler)
        .add_attribute("message_id", hex::encode(decoded.id))
        .add_attribute("total_fee", total))
}

pub fn execute_attestation_received(
    deps: DepsMut,
    info: MessageInfo,
    message: Binary,
) -> Result<Response, ContractError> {
    let transceiver = info.sender;
    let received = MessageReceived::decode(&message)?;

    let handler = HANDLER_BY_UNIVERSAL
        .may_load(deps.storage, received.handler_address.as_slice())?
        .ok_or_else(|| ContractError::MessageHandlerUnknown {
            handler: bytes32_to_hex(&received.handler_address),
        })?;
    let config = load_handler(deps.storage, &handler)?;
    if !config.transceivers.contains(&transceiver) {
        return Err(ContractError::TransceiverNotConfigured);
    }

    let digest = received.digest();
    let key = (&handler, received.source_chain_id, received.id.as_slice());
    let existing = ATTESTATIONS.may_load(deps.storage, key)?;
    if let Some(record) = &existing {
        if record.executed {
            return Ok(Response::new()
                .add_attribute("method", "attestation_received")
                .add_attribute("message_id", hex::encode(received.id))
                .add_attribute("already_executed", "true"));
        }
        if record.message_digest.as_slice() != digest.as_slice() {
            return Err(ContractError::DigestMismatch {
                recorded: hex::encode(record.message_digest.as_slice()),
            });
        }
    }

    let attested_key = (digest.as_slice(), &transceiver);
    if TRANSCEIVER_ATTESTATIONS
        .may_load(deps.storage, attested_key)?
        .unwrap_or(false)
    {
        return Err(ContractError::AttestationAlreadyReceived);
    }
    TRANSCEIVER_ATTESTATIONS.save(deps.storage, attested_key, &true)?;

    let num_attestations = NUM_ATTESTATIONS
        .may_load(deps.storage, digest.as_slice())?
        .unwrap_or(0)
        + 1;
    NUM_ATTESTATIONS.save(deps.storage, digest.as_slice(), &num_attestations)?;

    let mut record = existing.unwrap_or(AttestationRecord {
        message_digest: Binary::from(digest.to_vec()),
        num_attestations: 0,
        executed: false,
    });
    record.num_attestations += 1;

    let mut response = Response::new().add_event(
        LogBuilder::new(&ATTESTATION_RECEIVED)
            .byte32(&received.id)
            .uint16(received.source_chain_id)
            .byte32(&received.source_address)
            .byte32(&received.handler_address)
            .byte32(&digest)
            .uint64(num_attestations)
            .build()?,
    );

    if record.num_attestations >= config.threshold {
        record.executed = true;
        response = response
            .add_message(WasmMsg::Execute {
                contract_addr: handler.to_string(),
                msg: to_json_binary(&MessageHandlerExecuteMsg::HandleMessage { message })?,
                funds: vec![],
            })
            .add_event(
                LogBuilder::new(&MESSAGE_EXECUTED)
                    .string(handler.as_str())
                    .byte32(&received.id)
                    .byte32(&digest)
                    .build()?,
            );
    }
    ATTESTATIONS.save(deps.storage, key, &record)?;

    Ok(response
        .add_attribute("method", "attestation_received")
        .add_attribute("transceiver", transceiver)
        .add_attribute("message_id", hex::encode(received.id))
        .add_attribute("num_attestations", record.num_attestations.to_string())
        .add_attribute("executed", record.executed.to_string()))
}
