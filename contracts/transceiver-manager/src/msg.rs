//! Message types for the transceiver manager

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary};
use ntt_common::access_control::{HasRoleResponse, RoleAdminResponse};
use ntt_common::fee::FeePayment;
use ntt_common::transceiver::{QuoteResponse, TransceiverInstruction};

use crate::state::AttestationRecord;

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
pub struct InstantiateMsg {
    /// Receives DEFAULT_ADMIN
    pub admin: String,
    pub fee_denom: String,
}

#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // Handler Configuration
    // ========================================================================
    /// Register the caller as a message handler and make `admin` its admin.
    /// A second call from a known handler is a no-op.
    AddMessageHandler { admin: String },

    /// Append a transceiver to a handler's list (handler admin)
    AddTransceiver { handler: String, transceiver: String },

    /// Remove a transceiver from a handler's list (handler admin)
    RemoveTransceiver { handler: String, transceiver: String },

    /// Set the attestation threshold (the handler itself or its admin)
    SetThreshold { handler: String, threshold: u64 },

    // ========================================================================
    // Messaging
    // ========================================================================
    /// Quote and send through every configured transceiver of the calling
    /// handler. The attached fee must equal the sum of the quotes.
    SendMessageToTransceivers {
        fee_payment: FeePayment,
        /// Encoded `MessageToSend`
        message: Binary,
        transceiver_instructions: Vec<TransceiverInstruction>,
    },

    /// Called by a configured transceiver for each delivered message
    AttestationReceived {
        /// Encoded `MessageReceived`
        message: Binary,
    },

    // ========================================================================
    // Access Control
    // ========================================================================
    GrantRole { role: Binary, account: String },
    RevokeRole { role: Binary, account: String },
    RenounceRole { role: Binary },
    SetRoleAdmin { role: Binary, admin_role: Binary },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},

    #[returns(bool)]
    IsMessageHandlerKnown { handler: String },

    #[returns(HandlerTransceiversResponse)]
    HandlerTransceivers { handler: String },

    #[returns(bool)]
    IsTransceiverConfigured { handler: String, transceiver: String },

    #[returns(u64)]
    Threshold { handler: String },

    /// Sum of every configured transceiver's quote
    #[returns(QuoteResponse)]
    QuoteDeliveryPrices {
        handler: String,
        message: Binary,
        transceiver_instructions: Vec<TransceiverInstruction>,
    },

    #[returns(u64)]
    MessageAttestations { message_digest: Binary },

    #[returns(bool)]
    HasTransceiverAttested {
        message_digest: Binary,
        transceiver: String,
    },

    #[returns(Option<AttestationRecord>)]
    Attestation {
        handler: String,
        source_chain_id: u16,
        message_id: Binary,
    },

    #[returns(Binary)]
    CalculateMessageDigest { message: Binary },

    #[returns(Binary)]
    MessageHandlerAdminRole { handler: String },

    #[returns(HasRoleResponse)]
    HasRole { role: Binary, account: String },

    #[returns(RoleAdminResponse)]
    RoleAdmin { role: Binary },
}

#[cw_serde]
pub struct ConfigResponse {
    pub fee_denom: String,
}

#[cw_serde]
pub struct HandlerTransceiversResponse {
    pub transceivers: Vec<Addr>,
    pub threshold: u64,
}
