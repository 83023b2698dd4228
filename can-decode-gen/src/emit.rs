//! Rust source emission
//!
//! Renders compiled namespaces into one self-contained decode module. The
//! emitter walks the IR only - it never looks at the raw schema - and its
//! output is byte-deterministic for a given IR.
//!
//! The emitted module expects the schema loader's generated bindings in
//! scope, one module per namespace: a `<ns>_<msg>_t` raw struct, a
//! `<ns>_<msg>_unpack` function and a `<NS>_<MSG>_FRAME_ID` constant per
//! message, and a `<ns>_<msg>_<sig>_decode` function per signal, plus the
//! `CanFrameData` frame type.

use crate::compile::{CompiledMessage, CompiledNamespace};

const PARSE_RESULT_DEF: &str = "\
/// Outcome of probing one message against one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseResult {
    Mismatch,
    MalformedPayload,
    Ok,
}

";

/// Emits the generated decode module from compiled namespaces
pub struct RustEmitter;

impl RustEmitter {
    /// Emit the complete decode module for a set of namespaces.
    ///
    /// Section order mirrors the decode pipeline: header and collaborator
    /// imports, the shared tri-state result enum, then per namespace the
    /// record types, the per-message parse functions and the dispatch
    /// function.
    pub fn emit_module(namespaces: &[CompiledNamespace]) -> String {
        let mut out = String::new();
        out.push_str(&Self::emit_header(namespaces));
        out.push('\n');
        out.push_str(PARSE_RESULT_DEF);
        for namespace in namespaces {
            for message in &namespace.messages {
                out.push_str(&Self::emit_record_type(message));
            }
            for message in &namespace.messages {
                out.push_str(&Self::emit_parse_fn(namespace, message));
            }
            out.push_str(&Self::emit_dispatch_fn(namespace));
        }
        out
    }

    fn emit_header(namespaces: &[CompiledNamespace]) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "// Generated by can-decode-gen {}. Do not edit.\n",
            crate::VERSION
        ));
        out.push_str("//\n");
        out.push_str("// Expects the schema loader's generated bindings in scope: per message\n");
        out.push_str("// a `<ns>_<msg>_t` raw struct, `<ns>_<msg>_unpack` and\n");
        out.push_str("// `<NS>_<MSG>_FRAME_ID`, and per signal `<ns>_<msg>_<sig>_decode`.\n");
        out.push_str("#![allow(non_camel_case_types, non_snake_case)]\n\n");
        out.push_str("use super::CanFrameData;\n");
        for namespace in namespaces {
            out.push_str(&format!("use super::{}::*;\n", namespace.symbol));
        }
        out
    }

    fn emit_record_type(message: &CompiledMessage) -> String {
        let type_name = &message.descriptor.type_name;
        let mut out = String::new();

        out.push_str("#[derive(Debug, Clone, PartialEq)]\n");
        out.push_str(&format!("pub struct {} {{\n", type_name));
        for field in &message.descriptor.fields {
            out.push_str(&format!("    pub {}: f64,\n", field));
        }
        out.push_str("}\n\n");

        out.push_str(&format!("impl {} {{\n", type_name));
        out.push_str("    pub fn new() -> Self {\n");
        out.push_str("        Self {\n");
        for field in &message.descriptor.fields {
            out.push_str(&format!("            {}: 0.0,\n", field));
        }
        out.push_str("        }\n");
        out.push_str("    }\n\n");
        out.push_str("    pub fn print(&self) {\n");
        out.push_str(&format!("        println!(\"{}:\");\n", type_name));
        for field in &message.descriptor.fields {
            out.push_str(&format!(
                "        println!(\"    {0}:{{}}\", self.{0});\n",
                field
            ));
        }
        out.push_str("    }\n");
        out.push_str("}\n\n");

        out
    }

    fn emit_parse_fn(namespace: &CompiledNamespace, message: &CompiledMessage) -> String {
        let type_name = &message.descriptor.type_name;
        let gate_const = format!(
            "{}_{}_FRAME_ID",
            namespace.symbol.to_ascii_uppercase(),
            message.symbol.to_ascii_uppercase()
        );
        let mut out = String::new();

        out.push_str(&format!(
            "pub fn parse_{}_{}(can: &CanFrameData, data: &mut {}) -> ParseResult {{\n",
            namespace.symbol, message.symbol, type_name
        ));
        out.push_str(&format!("    if can.can_id != {} {{\n", gate_const));
        out.push_str("        return ParseResult::Mismatch;\n");
        out.push_str("    }\n\n");
        out.push_str(&format!(
            "    let tmp = match {}_{}_unpack(&can.data, can.can_dlc) {{\n",
            namespace.symbol, message.symbol
        ));
        out.push_str("        Some(tmp) => tmp,\n");
        out.push_str("        None => return ParseResult::MalformedPayload,\n");
        out.push_str("    };\n\n");
        for (field, signal) in message.descriptor.fields.iter().zip(&message.signals) {
            out.push_str(&format!(
                "    data.{} = {}_{}_{}_decode(tmp.{});\n",
                field, namespace.symbol, message.symbol, signal.symbol, signal.symbol
            ));
        }
        out.push_str("\n    ParseResult::Ok\n");
        out.push_str("}\n\n");

        out
    }

    fn emit_dispatch_fn(namespace: &CompiledNamespace) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "pub fn dispatch_{}(can: &CanFrameData, verbose: bool) {{\n",
            namespace.symbol
        ));
        for message in &namespace.messages {
            let var = &message.symbol;
            let type_name = &message.descriptor.type_name;
            out.push_str(&format!("    let mut {} = {}::new();\n", var, type_name));
            out.push_str(&format!(
                "    match parse_{}_{}(can, &mut {}) {{\n",
                namespace.symbol, message.symbol, var
            ));
            out.push_str("        ParseResult::Ok => {\n");
            out.push_str("            if verbose {\n");
            out.push_str(&format!("                {}.print();\n", var));
            out.push_str("            }\n");
            out.push_str("            return;\n");
            out.push_str("        }\n");
            out.push_str("        ParseResult::MalformedPayload => {\n");
            out.push_str(&format!(
                "            eprintln!(\"{}: payload failed to unpack\");\n",
                type_name
            ));
            out.push_str("            return;\n");
            out.push_str("        }\n");
            out.push_str("        ParseResult::Mismatch => {}\n");
            out.push_str("    }\n\n");
        }
        out.push_str("}\n\n");

        out
    }
}
