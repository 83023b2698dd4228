//! Core types for the decode-layer compiler
//!
//! This module defines the frame shape handed over by the frame-ingestion
//! collaborator, the runtime outcome types, and the error taxonomy.
//! Generation-time errors are fatal values; runtime outcomes are plain
//! values too - decoding never panics and a malformed frame never affects
//! the decoding of subsequent frames.

use crate::record::DecodedRecord;

/// Result type for generation-time operations
pub type Result<T> = std::result::Result<T, GenError>;

/// Raw CAN frame as handed over by the frame-ingestion collaborator
///
/// A complete, immutable snapshot of one frame: identifier, payload bytes
/// and data length code. Classic CAN only (up to 8 data bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanFrameData {
    /// CAN message ID (11-bit or 29-bit)
    pub can_id: u32,
    /// Frame data bytes (0-8 bytes)
    pub data: Vec<u8>,
    /// Data length code - number of valid data bytes
    pub can_dlc: u8,
}

impl CanFrameData {
    /// Create a frame from an ID and payload, deriving the DLC from the
    /// payload length.
    pub fn new(can_id: u32, data: Vec<u8>) -> Self {
        let can_dlc = data.len() as u8;
        Self {
            can_id,
            data,
            can_dlc,
        }
    }
}

/// Tri-state result of probing one message against one frame
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// Frame ID does not belong to this message - a negative probe result,
    /// not an error
    Mismatch,
    /// Frame ID matched but the payload was rejected by the unpack
    /// primitive (wrong length or corrupt bit pattern)
    MalformedPayload,
    /// Frame ID matched and every signal was decoded
    Decoded(DecodedRecord),
}

/// Terminal state of one dispatch call over a namespace
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Exactly one message matched and decoded cleanly
    Decoded(DecodedRecord),
    /// A message claimed the frame ID but its payload failed to unpack.
    /// The frame is dropped; `message` names the record type involved so
    /// callers can log or count the drop.
    Malformed {
        /// Record type name of the message that claimed the frame ID
        message: String,
    },
    /// No message in this namespace recognizes the frame ID. Not an error:
    /// another namespace may still claim the frame.
    NoMatch,
}

/// Fatal generation-time errors
///
/// All symbol generation relies on canonical-name uniqueness for field and
/// function addressing, so collisions abort compilation of the namespace.
/// Partial output must not be used after any of these.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    #[error(
        "signals '{first}' and '{second}' in message '{message}' both normalize to field '{field}'"
    )]
    DuplicateFieldName {
        message: String,
        first: String,
        second: String,
        field: String,
    },

    #[error(
        "messages '{first}' and '{second}' in namespace '{namespace}' both normalize to '{canonical}'"
    )]
    DuplicateMessageName {
        namespace: String,
        first: String,
        second: String,
        canonical: String,
    },

    #[error(
        "frame ID 0x{frame_id:X} is claimed by both '{first}' and '{second}' in namespace '{namespace}'"
    )]
    DuplicateFrameId {
        namespace: String,
        frame_id: u32,
        first: String,
        second: String,
    },
}

/// Errors raised while loading a schema source into a `Database`
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse DBC file: {0}")]
    DbcParse(String),

    #[error("frame ID 0x{frame_id:X} is defined by both '{first}' and '{second}'")]
    DuplicateFrameId {
        frame_id: u32,
        first: String,
        second: String,
    },
}
