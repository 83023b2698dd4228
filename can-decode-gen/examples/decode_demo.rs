//! End-to-end demo: fabricate a schema, compile it, dispatch a few frames
//! and print the emitted decode module.
//!
//! Usage:
//!   cargo run --example decode_demo

use anyhow::Result;
use can_decode_gen::schema::{Database, Message, Signal};
use can_decode_gen::{compile, CanFrameData, GeneratorConfig, RustEmitter};

fn engine_status() -> Message {
    Message {
        name: "EngineStatus".to_string(),
        frame_id: 0x100,
        signals: vec![
            Signal::linear("RPM", 0.25, 0.0),
            Signal::linear("EngineTemp", 1.0, -40.0),
        ],
        unpack: Box::new(|data, dlc| {
            let dlc = usize::from(dlc);
            if dlc < 3 || dlc > data.len() {
                return None;
            }
            Some(vec![
                i64::from(u16::from_le_bytes([data[0], data[1]])),
                i64::from(data[2]),
            ])
        }),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let database = Database {
        name: "demo".to_string(),
        messages: vec![engine_status()],
    };
    let config = GeneratorConfig::new().with_namespace_prefix("Skoda");
    let namespace = compile(database, &config)?;

    println!("=== Dispatching frames ===");
    let frames = [
        // raw RPM 400, raw temp 140 -> RPM 100.0, ENGINE_TEMP 100.0
        CanFrameData::new(0x100, vec![0x90, 0x01, 0x8C, 0, 0, 0, 0, 0]),
        // Unknown ID: silently ignored
        CanFrameData::new(0x101, vec![0; 8]),
        // Right ID, truncated payload: logged and dropped
        CanFrameData::new(0x100, vec![0x90]),
    ];
    for frame in &frames {
        let outcome = namespace.dispatch(frame, true);
        println!("frame 0x{:X} -> {:?}", frame.can_id, outcome);
    }

    println!("\n=== Emitted decode module ===");
    print!("{}", RustEmitter::emit_module(std::slice::from_ref(&namespace)));

    Ok(())
}
