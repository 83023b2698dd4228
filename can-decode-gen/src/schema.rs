//! Schema collaborator interface
//!
//! The shapes the external schema loader hands to the compiler: one
//! `Database` per namespace, messages with frame IDs and ordered signals,
//! and opaque unpack/decode primitives with bit layout, endianness and
//! linear scaling baked in. The compiler only calls these primitives - it
//! never recomputes layout or scaling.
//!
//! `loader::dbc` builds these shapes from Vector DBC files; tests and
//! embedders may fabricate them directly.

use std::fmt;

/// Per-signal decode primitive: raw field value to physical value
pub type SignalDecodeFn = Box<dyn Fn(i64) -> f64 + Send + Sync>;

/// Per-message unpack primitive: payload bytes and DLC to one raw field
/// value per signal, in signal declaration order. `None` means the
/// primitive rejected the payload (wrong length or corrupt bit pattern).
pub type UnpackFn = Box<dyn Fn(&[u8], u8) -> Option<Vec<i64>> + Send + Sync>;

/// One schema source, owning its messages in declaration order
///
/// Frame IDs are unique within a database. The loader guarantees this;
/// compilation re-checks it and fails fast on inconsistent input.
pub struct Database {
    /// Namespace name (typically the schema source stem)
    pub name: String,
    /// Messages in declaration order
    pub messages: Vec<Message>,
}

/// A message definition plus its unpack primitive
pub struct Message {
    /// Message name as authored in the schema
    pub name: String,
    /// CAN frame ID selecting this message
    pub frame_id: u32,
    /// Signals in declaration order
    pub signals: Vec<Signal>,
    /// Unpack primitive for this message's payload
    pub unpack: UnpackFn,
}

/// A signal definition plus its decode primitive
pub struct Signal {
    /// Signal name as authored in the schema
    pub name: String,
    /// Decode primitive (scale, offset, endianness baked in)
    pub decode: SignalDecodeFn,
}

impl Signal {
    /// Create a signal with an arbitrary decode primitive
    pub fn new(name: impl Into<String>, decode: SignalDecodeFn) -> Self {
        Self {
            name: name.into(),
            decode,
        }
    }

    /// Create a signal with a linear decode primitive:
    /// `physical = offset + factor * raw`
    pub fn linear(name: impl Into<String>, factor: f64, offset: f64) -> Self {
        Self {
            name: name.into(),
            decode: Box::new(move |raw| offset + factor * raw as f64),
        }
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("messages", &self.messages)
            .finish()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("name", &self.name)
            .field("frame_id", &self.frame_id)
            .field("signals", &self.signals)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
