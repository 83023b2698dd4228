//! Schema-to-decoder compilation
//!
//! Builds the decode layer for one namespace: per-message record
//! descriptors, per-message frame decoders with a tri-state outcome, and
//! the namespace dispatcher. The compiled form is the IR the emitter
//! renders - and it is directly executable, so decode semantics are
//! testable without string-comparing generated source.
//!
//! Compilation is single-threaded and runs once per namespace. The
//! compiled namespace holds no mutable state; decode and dispatch are pure
//! over their arguments and safe to call concurrently from multiple
//! threads.

use crate::config::GeneratorConfig;
use crate::ident;
use crate::record::{DecodedRecord, RecordDescriptor};
use crate::schema::{Database, Message, SignalDecodeFn, UnpackFn};
use crate::types::{CanFrameData, DecodeOutcome, DispatchOutcome, GenError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One compiled signal: canonical symbol fragment plus decode primitive
pub struct CompiledSignal {
    /// Lowercase canonical fragment (used in decode-binding symbols)
    pub symbol: String,
    decode: SignalDecodeFn,
}

/// One compiled message: frame-ID gate, unpack primitive, record shape
pub struct CompiledMessage {
    /// Lowercase canonical message fragment
    pub symbol: String,
    /// Frame ID selecting this message
    pub frame_id: u32,
    /// Synthesized record type descriptor
    pub descriptor: Arc<RecordDescriptor>,
    /// Signals in declaration order
    pub signals: Vec<CompiledSignal>,
    unpack: UnpackFn,
}

/// A compiled namespace: every message decoder plus the dispatcher
pub struct CompiledNamespace {
    /// Lowercase canonical namespace symbol (configured prefix applied)
    pub symbol: String,
    /// Messages in declaration order
    pub messages: Vec<CompiledMessage>,
}

/// Compile one namespace database into its decode layer.
///
/// Identifier synthesis is deterministic. Canonical-name collisions and
/// duplicate frame IDs are fatal: every operation below relies on
/// uniqueness for field and function addressing, so no partial output is
/// returned.
pub fn compile(database: Database, config: &GeneratorConfig) -> Result<CompiledNamespace> {
    let ns_symbol = ident::canonical(&config.namespace_name(&database.name));
    log::debug!(
        "Compiling namespace '{}' ({} messages)",
        ns_symbol,
        database.messages.len()
    );

    let mut messages = Vec::with_capacity(database.messages.len());
    let mut seen_symbols: HashMap<String, String> = HashMap::new();
    let mut seen_frame_ids: HashMap<u32, String> = HashMap::new();

    for message in database.messages {
        let msg_symbol = ident::canonical(&message.name);

        if let Some(first) = seen_symbols.insert(msg_symbol.clone(), message.name.clone()) {
            return Err(GenError::DuplicateMessageName {
                namespace: ns_symbol,
                first,
                second: message.name,
                canonical: msg_symbol,
            });
        }
        if let Some(first) = seen_frame_ids.insert(message.frame_id, message.name.clone()) {
            return Err(GenError::DuplicateFrameId {
                namespace: ns_symbol,
                frame_id: message.frame_id,
                first,
                second: message.name,
            });
        }

        messages.push(compile_message(&ns_symbol, msg_symbol, message)?);
    }

    Ok(CompiledNamespace {
        symbol: ns_symbol,
        messages,
    })
}

fn compile_message(
    ns_symbol: &str,
    msg_symbol: String,
    message: Message,
) -> Result<CompiledMessage> {
    let Message {
        name,
        frame_id,
        signals: raw_signals,
        unpack,
    } = message;

    let type_name = format!(
        "T_{}_{}",
        ns_symbol.to_ascii_uppercase(),
        msg_symbol.to_ascii_uppercase()
    );

    let mut fields = Vec::with_capacity(raw_signals.len());
    let mut signals = Vec::with_capacity(raw_signals.len());
    let mut seen_fields: HashMap<String, String> = HashMap::new();

    for signal in raw_signals {
        let symbol = ident::canonical(&signal.name);
        let field = symbol.to_ascii_uppercase();

        if let Some(first) = seen_fields.insert(field.clone(), signal.name.clone()) {
            return Err(GenError::DuplicateFieldName {
                message: name,
                first,
                second: signal.name,
                field,
            });
        }

        fields.push(field);
        signals.push(CompiledSignal {
            symbol,
            decode: signal.decode,
        });
    }

    Ok(CompiledMessage {
        symbol: msg_symbol,
        frame_id,
        descriptor: Arc::new(RecordDescriptor { type_name, fields }),
        signals,
        unpack,
    })
}

impl CompiledMessage {
    /// Probe this message against a frame.
    ///
    /// The frame-ID gate is the only selector of message identity; the
    /// payload is not inspected before it. Pure function of
    /// `(can_id, payload bytes, dlc)`: identical inputs yield identical
    /// outcomes and field values.
    pub fn decode(&self, frame: &CanFrameData) -> DecodeOutcome {
        if frame.can_id != self.frame_id {
            return DecodeOutcome::Mismatch;
        }

        let raw = match (self.unpack)(&frame.data, frame.can_dlc) {
            Some(raw) => raw,
            None => return DecodeOutcome::MalformedPayload,
        };

        // An unpack primitive that returns the wrong arity violates its
        // contract; treat the payload as malformed rather than panic.
        if raw.len() != self.signals.len() {
            log::warn!(
                "{}: unpack returned {} raw fields, expected {}",
                self.descriptor.type_name,
                raw.len(),
                self.signals.len()
            );
            return DecodeOutcome::MalformedPayload;
        }

        let mut record = DecodedRecord::new(Arc::clone(&self.descriptor));
        for (index, (signal, raw_value)) in self.signals.iter().zip(raw).enumerate() {
            record.set(index, (signal.decode)(raw_value));
        }
        DecodeOutcome::Decoded(record)
    }
}

impl CompiledNamespace {
    /// Try every message in declaration order against one frame.
    ///
    /// Frame IDs are unique within a namespace, so at most one message can
    /// match; probing stops at the first non-mismatch outcome. On a clean
    /// decode with `verbose` set, the record's dump is printed. A malformed
    /// payload is logged and returned as a value so callers can count or
    /// retry; the frame itself is dropped. An unrecognized frame ID is a
    /// silent no-op - another namespace may still claim the frame.
    pub fn dispatch(&self, frame: &CanFrameData, verbose: bool) -> DispatchOutcome {
        for message in &self.messages {
            match message.decode(frame) {
                DecodeOutcome::Mismatch => continue,
                DecodeOutcome::MalformedPayload => {
                    log::warn!(
                        "{}: payload failed to unpack (frame 0x{:X}, dlc {})",
                        message.descriptor.type_name,
                        frame.can_id,
                        frame.can_dlc
                    );
                    return DispatchOutcome::Malformed {
                        message: message.descriptor.type_name.clone(),
                    };
                }
                DecodeOutcome::Decoded(record) => {
                    if verbose {
                        print!("{}", record);
                    }
                    return DispatchOutcome::Decoded(record);
                }
            }
        }
        DispatchOutcome::NoMatch
    }

    /// Look up a compiled message by its canonical symbol
    pub fn message(&self, symbol: &str) -> Option<&CompiledMessage> {
        self.messages.iter().find(|m| m.symbol == symbol)
    }
}

impl fmt::Debug for CompiledSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSignal")
            .field("symbol", &self.symbol)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for CompiledMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledMessage")
            .field("symbol", &self.symbol)
            .field("frame_id", &self.frame_id)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for CompiledNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledNamespace")
            .field("symbol", &self.symbol)
            .field("messages", &self.messages)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Signal;

    /// EngineStatus (0x100): RPM = raw u16 LE * 0.25, payload must be at
    /// least 2 bytes
    fn engine_status() -> Message {
        Message {
            name: "EngineStatus".to_string(),
            frame_id: 0x100,
            signals: vec![Signal::linear("RPM", 0.25, 0.0)],
            unpack: Box::new(|data, dlc| {
                let dlc = usize::from(dlc);
                if dlc < 2 || dlc > data.len() {
                    return None;
                }
                Some(vec![i64::from(u16::from_le_bytes([data[0], data[1]]))])
            }),
        }
    }

    /// BatteryStatus (0x101): VOLTAGE = raw u16 LE * 0.01
    fn battery_status() -> Message {
        Message {
            name: "BatteryStatus".to_string(),
            frame_id: 0x101,
            signals: vec![Signal::linear("BatteryVoltage", 0.01, 0.0)],
            unpack: Box::new(|data, dlc| {
                let dlc = usize::from(dlc);
                if dlc < 2 || dlc > data.len() {
                    return None;
                }
                Some(vec![i64::from(u16::from_le_bytes([data[0], data[1]]))])
            }),
        }
    }

    fn demo_namespace() -> CompiledNamespace {
        let database = Database {
            name: "Demo".to_string(),
            messages: vec![engine_status(), battery_status()],
        };
        compile(database, &GeneratorConfig::new()).unwrap()
    }

    fn rpm_frame(raw: u16) -> CanFrameData {
        let bytes = raw.to_le_bytes();
        CanFrameData::new(0x100, vec![bytes[0], bytes[1], 0, 0, 0, 0, 0, 0])
    }

    #[test]
    fn test_symbol_synthesis() {
        let database = Database {
            name: "demo".to_string(),
            messages: vec![engine_status()],
        };
        let config = GeneratorConfig::new().with_namespace_prefix("Skoda");
        let namespace = compile(database, &config).unwrap();

        assert_eq!(namespace.symbol, "skoda_demo");
        let message = &namespace.messages[0];
        assert_eq!(message.symbol, "engine_status");
        assert_eq!(message.descriptor.type_name, "T_SKODA_DEMO_ENGINE_STATUS");
        assert_eq!(message.descriptor.fields, vec!["RPM".to_string()]);
    }

    #[test]
    fn test_decode_mismatch_on_foreign_id() {
        let namespace = demo_namespace();
        let frame = CanFrameData::new(0x222, vec![0; 8]);
        let message = namespace.message("engine_status").unwrap();
        assert_eq!(message.decode(&frame), DecodeOutcome::Mismatch);
    }

    #[test]
    fn test_decode_malformed_on_short_payload() {
        let namespace = demo_namespace();
        let frame = CanFrameData::new(0x100, vec![]);
        let message = namespace.message("engine_status").unwrap();
        assert_eq!(message.decode(&frame), DecodeOutcome::MalformedPayload);
    }

    #[test]
    fn test_decode_scales_signal() {
        let namespace = demo_namespace();
        let message = namespace.message("engine_status").unwrap();
        match message.decode(&rpm_frame(400)) {
            DecodeOutcome::Decoded(record) => {
                assert_eq!(record.get("RPM"), Some(100.0));
                assert_eq!(record.type_name(), "T_DEMO_ENGINE_STATUS");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_decode_is_deterministic() {
        let namespace = demo_namespace();
        let message = namespace.message("engine_status").unwrap();
        let frame = rpm_frame(1234);
        assert_eq!(message.decode(&frame), message.decode(&frame));
    }

    #[test]
    fn test_decode_rejects_wrong_unpack_arity() {
        let database = Database {
            name: "Demo".to_string(),
            messages: vec![Message {
                name: "Broken".to_string(),
                frame_id: 0x10,
                signals: vec![Signal::linear("A", 1.0, 0.0)],
                // Contract violation: two raw fields for one signal
                unpack: Box::new(|_, _| Some(vec![1, 2])),
            }],
        };
        let namespace = compile(database, &GeneratorConfig::new()).unwrap();
        let frame = CanFrameData::new(0x10, vec![0; 8]);
        assert_eq!(
            namespace.messages[0].decode(&frame),
            DecodeOutcome::MalformedPayload
        );
    }

    #[test]
    fn test_dispatch_matches_one_message() {
        let namespace = demo_namespace();
        match namespace.dispatch(&rpm_frame(400), false) {
            DispatchOutcome::Decoded(record) => {
                assert_eq!(record.type_name(), "T_DEMO_ENGINE_STATUS");
                assert_eq!(record.get("RPM"), Some(100.0));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_reaches_later_messages() {
        let namespace = demo_namespace();
        let frame = CanFrameData::new(0x101, vec![0x10, 0x27, 0, 0, 0, 0, 0, 0]);
        match namespace.dispatch(&frame, false) {
            DispatchOutcome::Decoded(record) => {
                assert_eq!(record.type_name(), "T_DEMO_BATTERY_STATUS");
                assert_eq!(record.get("BATTERY_VOLTAGE"), Some(100.0));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_no_match_is_silent() {
        let namespace = demo_namespace();
        let frame = CanFrameData::new(0x777, vec![0; 8]);
        assert_eq!(namespace.dispatch(&frame, false), DispatchOutcome::NoMatch);
    }

    #[test]
    fn test_dispatch_reports_malformed_payload() {
        let namespace = demo_namespace();
        let frame = CanFrameData::new(0x100, vec![]);
        assert_eq!(
            namespace.dispatch(&frame, false),
            DispatchOutcome::Malformed {
                message: "T_DEMO_ENGINE_STATUS".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_field_name_is_fatal() {
        let database = Database {
            name: "Demo".to_string(),
            messages: vec![Message {
                name: "EngineStatus".to_string(),
                frame_id: 0x100,
                signals: vec![
                    Signal::linear("EngineSpeed", 1.0, 0.0),
                    Signal::linear("engine_speed", 1.0, 0.0),
                ],
                unpack: Box::new(|_, _| None),
            }],
        };
        match compile(database, &GeneratorConfig::new()) {
            Err(GenError::DuplicateFieldName { field, .. }) => {
                assert_eq!(field, "ENGINE_SPEED");
            }
            other => panic!("expected duplicate field error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_message_name_is_fatal() {
        let database = Database {
            name: "Demo".to_string(),
            messages: vec![
                Message {
                    name: "EngineStatus".to_string(),
                    frame_id: 0x100,
                    signals: vec![],
                    unpack: Box::new(|_, _| None),
                },
                Message {
                    name: "engine_status".to_string(),
                    frame_id: 0x101,
                    signals: vec![],
                    unpack: Box::new(|_, _| None),
                },
            ],
        };
        match compile(database, &GeneratorConfig::new()) {
            Err(GenError::DuplicateMessageName { canonical, .. }) => {
                assert_eq!(canonical, "engine_status");
            }
            other => panic!("expected duplicate message error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_frame_id_is_fatal() {
        let database = Database {
            name: "Demo".to_string(),
            messages: vec![
                Message {
                    name: "EngineStatus".to_string(),
                    frame_id: 0x100,
                    signals: vec![],
                    unpack: Box::new(|_, _| None),
                },
                Message {
                    name: "BatteryStatus".to_string(),
                    frame_id: 0x100,
                    signals: vec![],
                    unpack: Box::new(|_, _| None),
                },
            ],
        };
        match compile(database, &GeneratorConfig::new()) {
            Err(GenError::DuplicateFrameId { frame_id, .. }) => {
                assert_eq!(frame_id, 0x100);
            }
            other => panic!("expected duplicate frame ID error, got {:?}", other),
        }
    }
}
