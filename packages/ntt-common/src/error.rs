//! Error types shared by the NTT contracts
//!
//! Every contract in the workspace returns this enum so that a failure raised
//! deep inside a shared helper (access control, codec, rate limiter) surfaces
//! with the same message regardless of which contract hit it.

use cosmwasm_std::{OverflowError, StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    // ========================================================================
    // Initialisation Errors
    // ========================================================================

    #[error("Contract is not initialised")]
    Uninitialized,

    #[error("Contract is already initialised")]
    AlreadyInitialised,

    #[error("Only the contract creator can initialise")]
    NotCreator,

    // ========================================================================
    // Authorization Errors
    // ========================================================================

    #[error("Unauthorized: {account} is missing role 0x{role}")]
    Unauthorized { role: String, account: String },

    #[error("Unauthorized caller: expected {expected}")]
    UnexpectedCaller { expected: String },

    // ========================================================================
    // Timelock Errors
    // ========================================================================

    #[error("Timestamp {requested} is before the earliest allowed {earliest}")]
    TimestampTooEarly { requested: u64, earliest: u64 },

    #[error("Minimum upgrade delay must be at least {min} seconds")]
    UpgradeDelayTooShort { min: u64 },

    #[error("No contract upgrade is scheduled")]
    NoScheduledUpgrade,

    #[error("Contract upgrade not ready: {remaining_seconds} seconds remaining")]
    UpgradeNotReady { remaining_seconds: u64 },

    // ========================================================================
    // Rate Limit Errors
    // ========================================================================

    #[error("Unknown rate limit bucket 0x{bucket_id}")]
    UnknownBucket { bucket_id: String },

    #[error("Rate limit bucket 0x{bucket_id} already exists")]
    BucketAlreadyExists { bucket_id: String },

    #[error("Insufficient capacity: {capacity} available, {requested} requested")]
    InsufficientCapacity { capacity: Uint128, requested: Uint128 },

    #[error("Unknown outbound queued transfer")]
    OutboundQueuedTransferUnknown,

    #[error("Outbound queued transfer is still queued: {remaining_seconds} seconds remaining")]
    OutboundQueuedTransferStillQueued { remaining_seconds: u64 },

    #[error("Unknown inbound queued transfer")]
    InboundQueuedTransferUnknown,

    #[error("Inbound queued transfer is still queued: {remaining_seconds} seconds remaining")]
    InboundQueuedTransferStillQueued { remaining_seconds: u64 },

    #[error("Canceller is not original sender")]
    OnlyOriginalSenderCanCancel,

    // ========================================================================
    // Envelope Errors
    // ========================================================================

    #[error("Malformed envelope: {reason}")]
    MalformedEnvelope { reason: String },

    #[error("Incorrect prefix: expected 0x{expected}, got 0x{got}")]
    IncorrectPrefix { expected: String, got: String },

    // ========================================================================
    // Fee Errors
    // ========================================================================

    #[error("Incorrect payment: expected {expected}, got {got}")]
    IncorrectPayment { expected: Uint128, got: Uint128 },

    #[error("Unknown fee payment receiver: {receiver}")]
    UnknownPaymentReceiver { receiver: String },

    // ========================================================================
    // Attestation Errors
    // ========================================================================

    #[error("Digest mismatch: attestation conflicts with recorded digest 0x{recorded}")]
    DigestMismatch { recorded: String },

    #[error("Attestation already received")]
    AttestationAlreadyReceived,

    #[error("Message handler unknown: {handler}")]
    MessageHandlerUnknown { handler: String },

    #[error("Maximum transceivers exceeded")]
    MaxTransceiversExceeded,

    #[error("Transceiver was already added")]
    TransceiverAlreadyAdded,

    #[error("Transceiver was not added")]
    TransceiverNotAdded,

    #[error("Transceiver not configured")]
    TransceiverNotConfigured,

    #[error("Message handler has zero transceivers")]
    NoTransceivers,

    #[error("Incorrect order or unknown transceiver in instructions")]
    InvalidInstructions,

    #[error("Cannot set zero threshold")]
    ZeroThreshold,

    #[error("Unexpected message source address")]
    UnexpectedSourceAddress,

    #[error("Message handler address mismatch")]
    MessageHandlerAddressMismatch,

    #[error("Message already executed")]
    MessageAlreadyExecuted,

    #[error("VAA already seen")]
    VaaAlreadySeen,

    // ========================================================================
    // Peer Errors
    // ========================================================================

    #[error("Invalid address length: expected 32 bytes, got {got}")]
    InvalidAddressLength { got: usize },

    #[error("Invalid address: {reason}")]
    InvalidAddress { reason: String },

    #[error("Cannot set itself as peer chain")]
    PeerCannotBeItself,

    #[error("Unknown peer chain: {chain_id}")]
    PeerChainUnknown { chain_id: u16 },

    #[error("Unknown peer address")]
    PeerAddressUnknown,

    #[error("Invalid peer decimals")]
    InvalidPeerDecimals,

    #[error("Peer decimals are {recorded}; use SetNttManagerPeerDecimals to change them")]
    PeerDecimalsMismatch { recorded: u8, requested: u8 },

    // ========================================================================
    // Transfer Errors
    // ========================================================================

    #[error("Contract is paused")]
    Paused,

    #[error("Contract is not paused")]
    NotPaused,

    #[error("Cannot transfer zero amount")]
    ZeroAmount,

    #[error("Invalid recipient address")]
    InvalidRecipient,

    #[error("Transfer amount has dust")]
    TransferAmountHasDust,

    #[error("Invalid target chain: {chain_id}")]
    InvalidTargetChain { chain_id: u16 },

    #[error("Amount overflows the wire format")]
    AmountOverflow,

    #[error("Message sequence exhausted")]
    SequenceExhausted,
}
