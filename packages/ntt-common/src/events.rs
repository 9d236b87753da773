//! Event schema table and structured log encoding
//!
//! Each event is a CosmWasm [`Event`] named after its layout. Besides one
//! readable attribute per field it carries a `log` attribute holding
//! `hex(selector ∥ tuple encoding)`, where the selector is the first four
//! bytes of SHA-512/256 over the canonical signature
//! (e.g. `MessageSent(byte[32])`).

use cosmwasm_std::Event;

use crate::codec::{Field, FieldType, Layout, TupleEncoder};
use crate::error::ContractError;
use crate::hash::sha512_256;

use FieldType::{Bool, Byte16, Byte32, Bytes, Str, Uint128, Uint16, Uint64, Uint8};

// ============================================================================
// Access Control
// ============================================================================

pub const ROLE_GRANTED: Layout = Layout::new(
    "RoleGranted",
    &[
        Field::new("role", Byte16),
        Field::new("account", Str),
        Field::new("sender", Str),
    ],
);

pub const ROLE_REVOKED: Layout = Layout::new(
    "RoleRevoked",
    &[
        Field::new("role", Byte16),
        Field::new("account", Str),
        Field::new("sender", Str),
    ],
);

pub const ROLE_ADMIN_CHANGED: Layout = Layout::new(
    "RoleAdminChanged",
    &[
        Field::new("role", Byte16),
        Field::new("previous_admin_role", Byte16),
        Field::new("new_admin_role", Byte16),
    ],
);

// ============================================================================
// Upgrade Timelock
// ============================================================================

pub const MIN_UPGRADE_DELAY_UPDATED: Layout = Layout::new(
    "MinUpgradeDelayUpdated",
    &[Field::new("delay", Uint64), Field::new("timestamp", Uint64)],
);

pub const UPGRADE_SCHEDULED: Layout = Layout::new(
    "UpgradeScheduled",
    &[Field::new("code_id", Uint64), Field::new("timestamp", Uint64)],
);

pub const UPGRADE_CANCELLED: Layout =
    Layout::new("UpgradeCancelled", &[Field::new("code_id", Uint64)]);

pub const UPGRADE_COMPLETED: Layout = Layout::new(
    "UpgradeCompleted",
    &[Field::new("code_id", Uint64), Field::new("version", Uint64)],
);

// ============================================================================
// Rate Limiter
// ============================================================================

pub const RATE_LIMIT_UPDATED: Layout = Layout::new(
    "RateLimitUpdated",
    &[Field::new("bucket_id", Byte32), Field::new("limit", Uint128)],
);

pub const RATE_DURATION_UPDATED: Layout = Layout::new(
    "RateDurationUpdated",
    &[Field::new("bucket_id", Byte32), Field::new("duration", Uint64)],
);

pub const OUTBOUND_TRANSFER_RATE_LIMITED: Layout = Layout::new(
    "OutboundTransferRateLimited",
    &[
        Field::new("sender", Str),
        Field::new("message_id", Byte32),
        Field::new("current_capacity", Uint128),
        Field::new("amount", Uint128),
    ],
);

pub const INBOUND_TRANSFER_RATE_LIMITED: Layout = Layout::new(
    "InboundTransferRateLimited",
    &[
        Field::new("recipient", Str),
        Field::new("message_digest", Byte32),
        Field::new("current_capacity", Uint128),
        Field::new("amount", Uint128),
    ],
);

pub const OUTBOUND_TRANSFER_DELETED: Layout =
    Layout::new("OutboundTransferDeleted", &[Field::new("message_id", Byte32)]);

pub const INBOUND_TRANSFER_DELETED: Layout = Layout::new(
    "InboundTransferDeleted",
    &[Field::new("message_digest", Byte32)],
);

// ============================================================================
// Transceivers
// ============================================================================

pub const MESSAGE_SENT: Layout = Layout::new("MessageSent", &[Field::new("message_id", Byte32)]);

pub const INTERNAL_QUOTE_DELIVERY_PRICE: Layout = Layout::new(
    "InternalQuoteDeliveryPrice",
    &[
        Field::new("message_id", Byte32),
        Field::new("transceiver_instruction", Bytes),
    ],
);

pub const INTERNAL_SEND_MESSAGE: Layout = Layout::new(
    "InternalSendMessage",
    &[
        Field::new("total_fee", Uint128),
        Field::new("message_id", Byte32),
        Field::new("transceiver_instruction", Bytes),
    ],
);

pub const WORMHOLE_PEER_SET: Layout = Layout::new(
    "WormholePeerSet",
    &[Field::new("chain_id", Uint16), Field::new("peer", Byte32)],
);

pub const RECEIVED_MESSAGE: Layout = Layout::new(
    "ReceivedMessage",
    &[Field::new("vaa_digest", Byte32), Field::new("message_id", Byte32)],
);

// ============================================================================
// Transceiver Manager
// ============================================================================

pub const MESSAGE_HANDLER_ADDED: Layout = Layout::new(
    "MessageHandlerAdded",
    &[Field::new("handler", Str), Field::new("admin", Str)],
);

pub const TRANSCEIVER_ADDED: Layout = Layout::new(
    "TransceiverAdded",
    &[Field::new("handler", Str), Field::new("transceiver", Str)],
);

pub const TRANSCEIVER_REMOVED: Layout = Layout::new(
    "TransceiverRemoved",
    &[Field::new("handler", Str), Field::new("transceiver", Str)],
);

pub const THRESHOLD_UPDATED: Layout = Layout::new(
    "ThresholdUpdated",
    &[Field::new("handler", Str), Field::new("threshold", Uint64)],
);

pub const MESSAGE_SENT_TO_TRANSCEIVER: Layout = Layout::new(
    "MessageSentToTransceiver",
    &[
        Field::new("handler", Str),
        Field::new("transceiver", Str),
        Field::new("message_id", Byte32),
    ],
);

pub const ATTESTATION_RECEIVED: Layout = Layout::new(
    "AttestationReceived",
    &[
        Field::new("message_id", Byte32),
        Field::new("source_chain_id", Uint16),
        Field::new("source_address", Byte32),
        Field::new("handler_address", Byte32),
        Field::new("message_digest", Byte32),
        Field::new("num_attestations", Uint64),
    ],
);

pub const MESSAGE_EXECUTED: Layout = Layout::new(
    "MessageExecuted",
    &[
        Field::new("handler", Str),
        Field::new("message_id", Byte32),
        Field::new("message_digest", Byte32),
    ],
);

// ============================================================================
// Manager And Token
// ============================================================================

pub const PAUSED: Layout = Layout::new("Paused", &[Field::new("paused", Bool)]);

pub const TRANSCEIVER_MANAGER_UPDATED: Layout = Layout::new(
    "TransceiverManagerUpdated",
    &[Field::new("transceiver_manager", Str)],
);

pub const NTT_MANAGER_PEER_SET: Layout = Layout::new(
    "NttManagerPeerSet",
    &[
        Field::new("chain_id", Uint16),
        Field::new("peer", Byte32),
        Field::new("decimals", Uint8),
        Field::new("is_new", Bool),
    ],
);

pub const TRANSFER_SENT: Layout = Layout::new(
    "TransferSent",
    &[
        Field::new("message_id", Byte32),
        Field::new("recipient", Byte32),
        Field::new("recipient_chain", Uint16),
        Field::new("amount", Uint128),
        Field::new("fee", Uint128),
    ],
);

pub const TRANSFER_REDEEMED: Layout =
    Layout::new("TransferRedeemed", &[Field::new("message_digest", Byte32)]);

pub const MINTED: Layout = Layout::new(
    "Minted",
    &[Field::new("receiver", Str), Field::new("amount", Uint128)],
);

/// Every event the contracts emit
pub const EVENT_SCHEMAS: &[&Layout] = &[
    &ROLE_GRANTED,
    &ROLE_REVOKED,
    &ROLE_ADMIN_CHANGED,
    &MIN_UPGRADE_DELAY_UPDATED,
    &UPGRADE_SCHEDULED,
    &UPGRADE_CANCELLED,
    &UPGRADE_COMPLETED,
    &RATE_LIMIT_UPDATED,
    &RATE_DURATION_UPDATED,
    &OUTBOUND_TRANSFER_RATE_LIMITED,
    &INBOUND_TRANSFER_RATE_LIMITED,
    &OUTBOUND_TRANSFER_DELETED,
    &INBOUND_TRANSFER_DELETED,
    &MESSAGE_SENT,
    &INTERNAL_QUOTE_DELIVERY_PRICE,
    &INTERNAL_SEND_MESSAGE,
    &WORMHOLE_PEER_SET,
    &RECEIVED_MESSAGE,
    &MESSAGE_HANDLER_ADDED,
    &TRANSCEIVER_ADDED,
    &TRANSCEIVER_REMOVED,
    &THRESHOLD_UPDATED,
    &MESSAGE_SENT_TO_TRANSCEIVER,
    &ATTESTATION_RECEIVED,
    &MESSAGE_EXECUTED,
    &PAUSED,
    &TRANSCEIVER_MANAGER_UPDATED,
    &NTT_MANAGER_PEER_SET,
    &TRANSFER_SENT,
    &TRANSFER_REDEEMED,
    &MINTED,
];

/// Look up a schema by event name
pub fn schema(name: &str) -> Option<&'static Layout> {
    EVENT_SCHEMAS.iter().copied().find(|layout| layout.name == name)
}

/// First four bytes of SHA-512/256 over the event signature
pub fn selector(layout: &Layout) -> [u8; 4] {
    let hash = sha512_256(layout.signature().as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

// ============================================================================
// Log Builder
// ============================================================================

/// Builds an event field by field, producing readable attributes and the
/// binary `log` attribute in one pass.
pub struct LogBuilder {
    layout: &'static Layout,
    encoder: TupleEncoder,
    attributes: Vec<(&'static str, String)>,
}

impl LogBuilder {
    pub fn new(layout: &'static Layout) -> Self {
        Self {
            layout,
            encoder: TupleEncoder::new(layout),
            attributes: Vec::with_capacity(layout.fields.len() + 1),
        }
    }

    fn attr(&mut self, value: String) {
        let key = self.encoder.next_field().map(|f| f.name).unwrap_or("extra");
        self.attributes.push((key, value));
    }

    pub fn byte16(mut self, value: &[u8; 16]) -> Self {
        self.attr(hex::encode(value));
        self.encoder = self.encoder.byte16(value);
        self
    }

    pub fn byte32(mut self, value: &[u8; 32]) -> Self {
        self.attr(hex::encode(value));
        self.encoder = self.encoder.byte32(value);
        self
    }

    pub fn uint8(mut self, value: u8) -> Self {
        self.attr(value.to_string());
        self.encoder = self.encoder.uint8(value);
        self
    }

    pub fn uint16(mut self, value: u16) -> Self {
        self.attr(value.to_string());
        self.encoder = self.encoder.uint16(value);
        self
    }

    pub fn uint64(mut self, value: u64) -> Self {
        self.attr(value.to_string());
        self.encoder = self.encoder.uint64(value);
        self
    }

    pub fn uint128(mut self, value: u128) -> Self {
        self.attr(value.to_string());
        self.encoder = self.encoder.uint128(value);
        self
    }

    pub fn boolean(mut self, value: bool) -> Self {
        self.attr(value.to_string());
        self.encoder = self.encoder.boolean(value);
        self
    }

    pub fn bytes(mut self, value: &[u8]) -> Self {
        self.attr(hex::encode(value));
        self.encoder = self.encoder.bytes(value);
        self
    }

    pub fn string(mut self, value: &str) -> Self {
        self.attr(value.to_string());
        self.encoder = self.encoder.string(value);
        self
    }

    pub fn build(self) -> Result<Event, ContractError> {
        let mut log = selector(self.layout).to_vec();
        log.extend(self.encoder.finish()?);
        Ok(Event::new(self.layout.name)
            .add_attributes(self.attributes)
            .add_attribute("log", hex::encode(log)))
    }
}
