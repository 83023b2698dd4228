//! CAN Decode-Layer Compiler Library
//!
//! Compiles a declarative description of CAN bus messages - namespaces of
//! messages identified by frame ID, each an ordered list of linearly
//! scaled signals - into a decode layer: synthesized record types, one
//! frame-ID-gated decode operation per message with a tri-state outcome,
//! and one dispatch operation per namespace.
//!
//! # Architecture
//!
//! The compiled form is an executable IR. `compile` turns a `Database`
//! (from the DBC loader, or fabricated in memory) into a
//! `CompiledNamespace` whose `decode`/`dispatch` run directly; the same IR
//! feeds `RustEmitter`, which renders a self-contained decode module as
//! source text.
//!
//! The library does NOT:
//! - Read frames off a wire (frame ingestion is a collaborator)
//! - Write generated sources to disk or orchestrate builds
//! - Encode signals (the decode layer is receive-only)
//! - Handle multiplexed signal layouts
//!
//! # Example Usage
//!
//! ```
//! use can_decode_gen::schema::{Database, Message, Signal};
//! use can_decode_gen::{compile, CanFrameData, DispatchOutcome, GeneratorConfig};
//!
//! // Fabricate a one-message namespace; real schemas come from
//! // `loader::load_dbc_file`.
//! let database = Database {
//!     name: "demo".to_string(),
//!     messages: vec![Message {
//!         name: "EngineStatus".to_string(),
//!         frame_id: 0x100,
//!         signals: vec![Signal::linear("RPM", 0.25, 0.0)],
//!         unpack: Box::new(|data, dlc| {
//!             let dlc = usize::from(dlc);
//!             if dlc < 2 || dlc > data.len() {
//!                 return None;
//!             }
//!             Some(vec![i64::from(u16::from_le_bytes([data[0], data[1]]))])
//!         }),
//!     }],
//! };
//!
//! let namespace = compile(database, &GeneratorConfig::new()).unwrap();
//!
//! // raw RPM = 400, scaled by 0.25
//! let frame = CanFrameData::new(0x100, vec![0x90, 0x01, 0, 0, 0, 0, 0, 0]);
//! match namespace.dispatch(&frame, false) {
//!     DispatchOutcome::Decoded(record) => {
//!         assert_eq!(record.type_name(), "T_DEMO_ENGINE_STATUS");
//!         assert_eq!(record.get("RPM"), Some(100.0));
//!     }
//!     other => panic!("unexpected outcome: {:?}", other),
//! }
//! ```

// Public modules
pub mod compile;
pub mod config;
pub mod emit;
pub mod ident;
pub mod loader;
pub mod record;
pub mod schema;
pub mod types;

// Re-export main types for convenience
pub use compile::{compile, CompiledMessage, CompiledNamespace, CompiledSignal};
pub use config::GeneratorConfig;
pub use emit::RustEmitter;
pub use loader::load_dbc_file;
pub use record::{DecodedRecord, RecordDescriptor};
pub use types::{
    CanFrameData, DecodeOutcome, DispatchOutcome, GenError, LoaderError, Result,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
