//! DBC schema loader
//!
//! Parses Vector DBC files with the `can-dbc` crate and builds the
//! `Database` collaborator shape. Each message gets an unpack primitive
//! that validates the DLC against the declared message size and extracts
//! one raw value per signal; each signal gets a linear decode primitive
//! from its factor and offset.

use super::{ByteOrder, Result, SignalLayout, ValueType};
use crate::schema::{Database, Message, Signal};
use crate::types::LoaderError;
use std::collections::HashMap;
use std::path::Path;

/// Load a DBC file into a `Database` named after the file stem.
pub fn load_dbc_file(path: &Path) -> Result<Database> {
    log::info!("Loading DBC file: {:?}", path);

    let bytes = std::fs::read(path)?;
    // DBC files from older tools are often Latin-1; fall back when the
    // content is not valid UTF-8.
    let content = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("DBC file is not UTF-8, falling back to Latin-1");
            err.into_bytes().iter().map(|&b| b as char).collect()
        }
    };

    let dbc = can_dbc::DBC::from_slice(content.as_bytes())
        .map_err(|e| LoaderError::DbcParse(format!("{:?} in {:?}", e, path)))?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed")
        .to_string();

    let database = database_from_dbc(name, &dbc)?;
    log::info!(
        "Loaded {} messages from {:?}",
        database.messages.len(),
        path
    );
    Ok(database)
}

/// Build a `Database` from an already-parsed DBC.
///
/// Frame-ID uniqueness within the namespace is enforced here - it is the
/// loader guarantee the decode layer relies on for dispatch exclusivity.
pub fn database_from_dbc(name: impl Into<String>, dbc: &can_dbc::DBC) -> Result<Database> {
    let mut messages = Vec::new();
    let mut seen_frame_ids: HashMap<u32, String> = HashMap::new();

    for dbc_msg in dbc.messages() {
        let message = convert_message(dbc_msg);
        if let Some(first) = seen_frame_ids.insert(message.frame_id, message.name.clone()) {
            return Err(LoaderError::DuplicateFrameId {
                frame_id: message.frame_id,
                first,
                second: message.name,
            });
        }
        messages.push(message);
    }

    Ok(Database {
        name: name.into(),
        messages,
    })
}

fn convert_message(dbc_msg: &can_dbc::Message) -> Message {
    let frame_id = match dbc_msg.message_id() {
        can_dbc::MessageId::Standard(id) => u32::from(*id),
        can_dbc::MessageId::Extended(id) => *id,
    };
    let size = *dbc_msg.message_size() as usize;

    let mut layouts = Vec::with_capacity(dbc_msg.signals().len());
    let mut signals = Vec::with_capacity(dbc_msg.signals().len());
    for dbc_sig in dbc_msg.signals() {
        layouts.push(convert_layout(dbc_sig));
        signals.push(Signal::linear(
            dbc_sig.name().clone(),
            *dbc_sig.factor(),
            *dbc_sig.offset(),
        ));
    }

    let unpack = move |data: &[u8], dlc: u8| -> Option<Vec<i64>> {
        let dlc = usize::from(dlc);
        if dlc < size || dlc > data.len() {
            return None;
        }
        let payload = &data[..dlc];
        layouts.iter().map(|layout| layout.extract(payload)).collect()
    };

    Message {
        name: dbc_msg.message_name().clone(),
        frame_id,
        signals,
        unpack: Box::new(unpack),
    }
}

fn convert_layout(dbc_sig: &can_dbc::Signal) -> SignalLayout {
    SignalLayout {
        start_bit: *dbc_sig.start_bit() as u16,
        length: *dbc_sig.signal_size() as u16,
        byte_order: match *dbc_sig.byte_order() {
            can_dbc::ByteOrder::LittleEndian => ByteOrder::LittleEndian,
            can_dbc::ByteOrder::BigEndian => ByteOrder::BigEndian,
        },
        value_type: match *dbc_sig.value_type() {
            can_dbc::ValueType::Signed => ValueType::Signed,
            can_dbc::ValueType::Unsigned => ValueType::Unsigned,
        },
    }
}
