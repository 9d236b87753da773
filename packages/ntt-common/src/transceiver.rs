//! Transceiver plumbing shared by every transceiver contract
//!
//! A concrete transceiver implements [`Transceiver`] for quoting and for the
//! actual send. The shared entry points below enforce the common rules:
//! only the transceiver manager may send, the fee must be paid exactly, and
//! delivered messages are forwarded back to the transceiver manager.

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{
    to_json_binary, Addr, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult, Storage,
    Uint128, WasmMsg,
};
use cw_storage_plus::Item;

use crate::codec::{MessageReceived, MessageToSend};
use crate::error::ContractError;
use crate::events::{LogBuilder, MESSAGE_SENT};
use crate::fee::{check_fee_payment, FeePayment};

/// Upper bound on transceivers per message handler
pub const MAX_TRANSCEIVERS: usize = 32;

// ============================================================================
// Cross-Contract Messages
// ============================================================================

/// Execute interface every transceiver accepts from the transceiver manager
#[cw_serde]
pub enum TransceiverExecuteMsg {
    SendMessage {
        fee_payment: FeePayment,
        /// Encoded `MessageToSend`
        message: Binary,
        transceiver_instruction: Binary,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum TransceiverQueryMsg {
    #[returns(QuoteResponse)]
    QuoteDeliveryPrice {
        message: Binary,
        transceiver_instruction: Binary,
    },
}

#[cw_serde]
pub struct QuoteResponse {
    pub price: Uint128,
}

/// Execute interface of the transceiver manager as seen by transceivers
#[cw_serde]
pub enum AttestationExecuteMsg {
    AttestationReceived {
        /// Encoded `MessageReceived`
        message: Binary,
    },
}

/// Execute interface every message handler accepts from the transceiver manager
#[cw_serde]
pub enum MessageHandlerExecuteMsg {
    HandleMessage { message: Binary },
}

/// Per-transceiver instruction, in configured transceiver order
#[cw_serde]
pub struct TransceiverInstruction {
    pub transceiver: String,
    pub instruction: Binary,
}

// ============================================================================
// Base State
// ============================================================================

#[cw_serde]
pub struct TransceiverBase {
    pub transceiver_manager: Addr,
    /// Native denom fees are paid in
    pub fee_denom: String,
}

const TRANSCEIVER_BASE: Item<TransceiverBase> = Item::new("transceiver_base");

pub fn init_transceiver_base(storage: &mut dyn Storage, base: &TransceiverBase) -> StdResult<()> {
    TRANSCEIVER_BASE.save(storage, base)
}

pub fn load_transceiver_base(storage: &dyn Storage) -> StdResult<TransceiverBase> {
    TRANSCEIVER_BASE.load(storage)
}

// ============================================================================
// Transceiver Trait
// ============================================================================

pub trait Transceiver {
    /// Price in the fee denom to deliver `message` to its destination chain
    fn quote_delivery_price(
        &self,
        deps: Deps,
        env: &Env,
        message: &MessageToSend,
        transceiver_instruction: &[u8],
    ) -> Result<Uint128, ContractError>;

    /// Publish `message`. `total_fee` has already been checked against the quote.
    fn send_message(
        &self,
        deps: DepsMut,
        env: &Env,
        total_fee: Uint128,
        message: &MessageToSend,
        transceiver_instruction: &[u8],
    ) -> Result<Response, ContractError>;
}

/// Shared `SendMessage` entry point
pub fn execute_send_message<T: Transceiver>(
    transceiver: &T,
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    fee_payment: FeePayment,
    message: Binary,
    transceiver_instruction: Binary,
) -> Result<Response, ContractError> {
    let base = TRANSCEIVER_BASE.load(deps.storage)?;
    if info.sender != base.transceiver_manager {
        return Err(ContractError::UnexpectedCaller {
            expected: base.transceiver_manager.to_string(),
        });
    }

    let message = MessageToSend::decode(&message)?;
    let price =
        transceiver.quote_delivery_price(deps.as_ref(), &env, &message, &transceiver_instruction)?;
    check_fee_payment(&env, &info, &fee_payment, &base.fee_denom, price)?;

    let response = transceiver.send_message(deps, &env, price, &message, &transceiver_instruction)?;
    let event = LogBuilder::new(&MESSAGE_SENT).byte32(&message.id).build()?;
    Ok(response
        .add_event(event)
        .add_attribute("message_id", hex::encode(message.id)))
}

/// Shared `QuoteDeliveryPrice` query
pub fn query_quote_delivery_price<T: Transceiver>(
    transceiver: &T,
    deps: Deps,
    env: Env,
    message: Binary,
    transceiver_instruction: Binary,
) -> Result<QuoteResponse, ContractError> {
    let message = MessageToSend::decode(&message)?;
    let price = transceiver.quote_delivery_price(deps, &env, &message, &transceiver_instruction)?;
    Ok(QuoteResponse { price })
}

/// Forward a delivered message to the transceiver manager for attestation
pub fn deliver_message(
    storage: &dyn Storage,
    message: &MessageReceived,
) -> Result<WasmMsg, ContractError> {
    let base = TRANSCEIVER_BASE.load(storage)?;
    Ok(WasmMsg::Execute {
        contract_addr: base.transceiver_manager.to_string(),
        msg: to_json_binary(&AttestationExecuteMsg::AttestationReceived {
            message: Binary::from(message.encode()?),
        })?,
        funds: vec![],
    })
}
