//! Message envelope codec
//!
//! Messages and event logs share one tuple encoding driven by a static
//! [`Layout`] table:
//!
//! ```text
//! | fixed-width fields ... | u16 pointer per dynamic field ... | u16 len | bytes | ... |
//! |<------------------- head (Layout::head_len) ------------------>|<--- sections --->|
//! ```
//!
//! Integers are big-endian. Each pointer is the absolute offset of its
//! section from the start of the encoding and must equal the running offset
//! exactly: sections are contiguous, in field order, and the last one ends at
//! the last byte of the input.
//!
//! # MessageToSend (132-byte head)
//! - id (32), user_address (32), source_address (32), destination_chain_id (2),
//!   handler_address (32), payload pointer (2)
//!
//! # MessageReceived (132-byte head)
//! - id (32), user_address (32), source_chain_id (2), source_address (32),
//!   handler_address (32), payload pointer (2)

use crate::error::ContractError;
use crate::hash::keccak256_concat;

// ============================================================================
// Layouts
// ============================================================================

/// Wire type of a single tuple field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Byte16,
    Byte32,
    Uint8,
    Uint16,
    Uint64,
    Uint128,
    Bool,
    /// Length-prefixed byte string stored in the tail
    Bytes,
    /// Length-prefixed UTF-8 string stored in the tail
    Str,
}

impl FieldType {
    /// Canonical name used when building signatures
    pub const fn type_name(self) -> &'static str {
        match self {
            FieldType::Byte16 => "byte[16]",
            FieldType::Byte32 => "byte[32]",
            FieldType::Uint8 => "uint8",
            FieldType::Uint16 => "uint16",
            FieldType::Uint64 => "uint64",
            FieldType::Uint128 => "uint128",
            FieldType::Bool => "bool",
            FieldType::Bytes => "byte[]",
            FieldType::Str => "string",
        }
    }

    /// Bytes the field occupies in the head (a pointer for dynamic fields)
    pub const fn head_width(self) -> usize {
        match self {
            FieldType::Byte16 => 16,
            FieldType::Byte32 => 32,
            FieldType::Uint8 | FieldType::Bool => 1,
            FieldType::Uint16 => 2,
            FieldType::Uint64 => 8,
            FieldType::Uint128 => 16,
            FieldType::Bytes | FieldType::Str => POINTER_WIDTH,
        }
    }

    pub const fn is_dynamic(self) -> bool {
        matches!(self, FieldType::Bytes | FieldType::Str)
    }
}

/// A named field of a layout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
}

impl Field {
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty }
    }
}

/// Static description of a tuple: a message kind or an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub name: &'static str,
    pub fields: &'static [Field],
}

impl Layout {
    pub const fn new(name: &'static str, fields: &'static [Field]) -> Self {
        Self { name, fields }
    }

    /// Total width of the head including the pointer table
    pub const fn head_len(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].ty.head_width();
            i += 1;
        }
        total
    }

    /// Human-readable signature, e.g. `MessageSent(byte[32])`
    pub fn signature(&self) -> String {
        let args: Vec<&str> = self.fields.iter().map(|f| f.ty.type_name()).collect();
        format!("{}({})", self.name, args.join(","))
    }
}

/// Width of a section pointer and of a section length prefix
pub const POINTER_WIDTH: usize = 2;

use FieldType::{Byte32, Bytes, Uint16};

pub const MESSAGE_TO_SEND: Layout = Layout::new(
    "MessageToSend",
    &[
        Field::new("id", Byte32),
        Field::new("user_address", Byte32),
        Field::new("source_address", Byte32),
        Field::new("destination_chain_id", Uint16),
        Field::new("handler_address", Byte32),
        Field::new("payload", Bytes),
    ],
);

pub const MESSAGE_RECEIVED: Layout = Layout::new(
    "MessageReceived",
    &[
        Field::new("id", Byte32),
        Field::new("user_address", Byte32),
        Field::new("source_chain_id", Uint16),
        Field::new("source_address", Byte32),
        Field::new("handler_address", Byte32),
        Field::new("payload", Bytes),
    ],
);

const _: () = assert!(MESSAGE_TO_SEND.head_len() == 132);
const _: () = assert!(MESSAGE_RECEIVED.head_len() == 132);

fn malformed(reason: impl Into<String>) -> ContractError {
    ContractError::MalformedEnvelope {
        reason: reason.into(),
    }
}

// ============================================================================
// Encoder
// ============================================================================

/// Writes values in layout order. Calling a writer that does not match the
/// next field's type is a programming error and is caught in debug builds.
#[derive(Debug)]
pub struct TupleEncoder {
    layout: &'static Layout,
    head: Vec<u8>,
    tail: Vec<u8>,
    index: usize,
    oversized: Option<usize>,
}

impl TupleEncoder {
    pub fn new(layout: &'static Layout) -> Self {
        Self {
            layout,
            head: Vec::with_capacity(layout.head_len()),
            tail: Vec::new(),
            index: 0,
            oversized: None,
        }
    }

    /// Name of the field the next write fills
    pub fn next_field(&self) -> Option<&'static Field> {
        self.layout.fields.get(self.index)
    }

    fn advance(&mut self, ty: FieldType) {
        debug_assert_eq!(
            self.next_field().map(|f| f.ty),
            Some(ty),
            "{} field {} written with wrong type",
            self.layout.name,
            self.index
        );
        self.index += 1;
    }

    pub fn byte16(mut self, value: &[u8; 16]) -> Self {
        self.advance(FieldType::Byte16);
        self.head.extend_from_slice(value);
        self
    }

    pub fn byte32(mut self, value: &[u8; 32]) -> Self {
        self.advance(FieldType::Byte32);
        self.head.extend_from_slice(value);
        self
    }

    pub fn uint8(mut self, value: u8) -> Self {
        self.advance(FieldType::Uint8);
        self.head.push(value);
        self
    }

    pub fn uint16(mut self, value: u16) -> Self {
        self.advance(FieldType::Uint16);
        self.head.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn uint64(mut self, value: u64) -> Self {
        self.advance(FieldType::Uint64);
        self.head.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn uint128(mut self, value: u128) -> Self {
        self.advance(FieldType::Uint128);
        self.head.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn boolean(mut self, value: bool) -> Self {
        self.advance(FieldType::Bool);
        self.head.push(u8::from(value));
        self
    }

    pub fn bytes(mut self, value: &[u8]) -> Self {
        self.advance(FieldType::Bytes);
        self.push_section(value);
        self
    }

    pub fn string(mut self, value: &str) -> Self {
        self.advance(FieldType::Str);
        self.push_section(value.as_bytes());
        self
    }

    fn push_section(&mut self, value: &[u8]) {
        let pointer = self.layout.head_len() + self.tail.len();
        match (u16::try_from(pointer), u16::try_from(value.len())) {
            (Ok(pointer), Ok(len)) => {
                self.head.extend_from_slice(&pointer.to_be_bytes());
                self.tail.extend_from_slice(&len.to_be_bytes());
                self.tail.extend_from_slice(value);
            }
            _ => {
                // keep the head width consistent so later fields still line up
                self.head.extend_from_slice(&[0u8; POINTER_WIDTH]);
                self.oversized.get_or_insert(value.len());
            }
        }
    }

    /// Concatenate head and sections.
    pub fn finish(self) -> Result<Vec<u8>, ContractError> {
        if let Some(len) = self.oversized {
            return Err(malformed(format!(
                "{} section of {} bytes exceeds the u16 length prefix",
                self.layout.name, len
            )));
        }
        debug_assert_eq!(self.index, self.layout.fields.len());
        let mut out = self.head;
        out.extend_from_slice(&self.tail);
        Ok(out)
    }
}

// ============================================================================
// Decoder
// ============================================================================

/// Reads values in layout order while validating the pointer table.
#[derive(Debug)]
pub struct TupleDecoder<'a> {
    layout: &'static Layout,
    data: &'a [u8],
    head_pos: usize,
    next_section: usize,
    index: usize,
}

impl<'a> TupleDecoder<'a> {
    pub fn new(layout: &'static Layout, data: &'a [u8]) -> Result<Self, ContractError> {
        let head_len = layout.head_len();
        if data.len() < head_len {
            return Err(malformed(format!(
                "{} length {} is less than the {} byte header",
                layout.name,
                data.len(),
                head_len
            )));
        }
        Ok(Self {
            layout,
            data,
            head_pos: 0,
            next_section: head_len,
            index: 0,
        })
    }

    fn take_head<const N: usize>(&mut self, ty: FieldType) -> [u8; N] {
        debug_assert_eq!(self.layout.fields.get(self.index).map(|f| f.ty), Some(ty));
        self.index += 1;
        let mut out = [0u8; N];
        // head length was checked in new()
        out.copy_from_slice(&self.data[self.head_pos..self.head_pos + N]);
        self.head_pos += N;
        out
    }

    pub fn byte16(&mut self) -> [u8; 16] {
        self.take_head::<16>(FieldType::Byte16)
    }

    pub fn byte32(&mut self) -> [u8; 32] {
        self.take_head::<32>(FieldType::Byte32)
    }

    pub fn uint8(&mut self) -> u8 {
        self.take_head::<1>(FieldType::Uint8)[0]
    }

    pub fn uint16(&mut self) -> u16 {
        u16::from_be_bytes(self.take_head::<2>(FieldType::Uint16))
    }

    pub fn uint64(&mut self) -> u64 {
        u64::from_be_bytes(self.take_head::<8>(FieldType::Uint64))
    }

    pub fn uint128(&mut self) -> u128 {
        u128::from_be_bytes(self.take_head::<16>(FieldType::Uint128))
    }

    pub fn boolean(&mut self) -> Result<bool, ContractError> {
        match self.take_head::<1>(FieldType::Bool)[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(malformed(format!("invalid bool byte {other}"))),
        }
    }

    pub fn bytes(&mut self) -> Result<&'a [u8], ContractError> {
        self.section(FieldType::Bytes)
    }

    pub fn string(&mut self) -> Result<&'a str, ContractError> {
        let raw = self.section(FieldType::Str)?;
        std::str::from_utf8(raw).map_err(|_| malformed("string section is not UTF-8"))
    }

    fn section(&mut self, ty: FieldType) -> Result<&'a [u8], ContractError> {
        let field = self.layout.fields.get(self.index).map(|f| f.name).unwrap_or("?");
        let pointer = usize::from(u16::from_be_bytes(self.take_head::<2>(ty)));
        if pointer != self.next_section {
            return Err(malformed(format!(
                "invalid tail pointer for {field}: expected {}, got {pointer}",
                self.next_section
            )));
        }
        let Some(prefix) = self.data.get(pointer..pointer + POINTER_WIDTH) else {
            return Err(malformed(format!("missing length prefix for {field}")));
        };
        let len = usize::from(u16::from_be_bytes([prefix[0], prefix[1]]));
        let start = pointer + POINTER_WIDTH;
        let Some(body) = self.data.get(start..start + len) else {
            return Err(malformed(format!(
                "invalid number of bytes for {field}: declared {len}, available {}",
                self.data.len() - start
            )));
        };
        self.next_section = start + len;
        Ok(body)
    }

    /// Ensure every field was read and nothing trails the last section.
    pub fn finish(self) -> Result<(), ContractError> {
        debug_assert_eq!(self.index, self.layout.fields.len());
        if self.next_section != self.data.len() {
            return Err(malformed(format!(
                "invalid number of bytes: {} consumed of {}",
                self.next_section,
                self.data.len()
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Outbound message handed by a message handler to the transceivers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageToSend {
    /// Groups copies of the same message across transceivers
    pub id: [u8; 32],
    pub user_address: [u8; 32],
    pub source_address: [u8; 32],
    pub destination_chain_id: u16,
    pub handler_address: [u8; 32],
    pub payload: Vec<u8>,
}

impl MessageToSend {
    pub fn encode(&self) -> Result<Vec<u8>, ContractError> {
        TupleEncoder::new(&MESSAGE_TO_SEND)
            .byte32(&self.id)
            .byte32(&self.user_address)
            .byte32(&self.source_address)
            .uint16(self.destination_chain_id)
            .byte32(&self.handler_address)
            .bytes(&self.payload)
            .finish()
    }

    pub fn decode(data: &[u8]) -> Result<Self, ContractError> {
        let mut d = TupleDecoder::new(&MESSAGE_TO_SEND, data)?;
        let message = Self {
            id: d.byte32(),
            user_address: d.byte32(),
            source_address: d.byte32(),
            destination_chain_id: d.uint16(),
            handler_address: d.byte32(),
            payload: d.bytes()?.to_vec(),
        };
        d.finish()?;
        Ok(message)
    }
}

/// Inbound message as delivered by a transceiver
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageReceived {
    pub id: [u8; 32],
    pub user_address: [u8; 32],
    pub source_chain_id: u16,
    pub source_address: [u8; 32],
    pub handler_address: [u8; 32],
    pub payload: Vec<u8>,
}

impl MessageReceived {
    pub fn encode(&self) -> Result<Vec<u8>, ContractError> {
        TupleEncoder::new(&MESSAGE_RECEIVED)
            .byte32(&self.id)
            .byte32(&self.user_address)
            .uint16(self.source_chain_id)
            .byte32(&self.source_address)
            .byte32(&self.handler_address)
            .bytes(&self.payload)
            .finish()
    }

    pub fn decode(data: &[u8]) -> Result<Self, ContractError> {
        let mut d = TupleDecoder::new(&MESSAGE_RECEIVED, data)?;
        let message = Self {
            id: d.byte32(),
            user_address: d.byte32(),
            source_chain_id: d.uint16(),
            source_address: d.byte32(),
            handler_address: d.byte32(),
            payload: d.bytes()?.to_vec(),
        };
        d.finish()?;
        Ok(message)
    }

    /// keccak256(id ∥ user ∥ source_chain ∥ source_address ∥ handler ∥ payload)
    pub fn digest(&self) -> [u8; 32] {
        keccak256_concat(&[
            &self.id,
            &self.user_address,
            &self.source_chain_id.to_be_bytes(),
            &self.source_address,
            &self.handler_address,
            self.payload.as_slice(),
        ])
    }
}

// ============================================================================
// Byte Cursor
// ============================================================================

/// Sequential reader for fixed-format payloads (NTT and transceiver payloads).
#[derive(Debug)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], ContractError> {
        let slice = self.slice(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub fn slice(&mut self, len: usize) -> Result<&'a [u8], ContractError> {
        let end = self.pos + len;
        let out = self.data.get(self.pos..end).ok_or_else(|| {
            malformed(format!(
                "payload too short: need {} bytes at offset {}, have {}",
                len,
                self.pos,
                self.data.len()
            ))
        })?;
        self.pos = end;
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, ContractError> {
        Ok(self.array::<1>()?[0])
    }

    pub fn u16(&mut self) -> Result<u16, ContractError> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    pub fn u64(&mut self) -> Result<u64, ContractError> {
        Ok(u64::from_be_bytes(self.array()?))
    }

    /// Read a u16 length prefix followed by that many bytes
    pub fn prefixed(&mut self) -> Result<&'a [u8], ContractError> {
        let len = usize::from(self.u16()?);
        self.slice(len)
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn expect_prefix(&mut self, prefix: &[u8; 4]) -> Result<(), ContractError> {
        let got = self.array::<4>()?;
        if &got != prefix {
            return Err(ContractError::IncorrectPrefix {
                expected: hex::encode(prefix),
                got: hex::encode(got),
            });
        }
        Ok(())
    }
}
