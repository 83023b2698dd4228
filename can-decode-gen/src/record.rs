//! Synthesized record types
//!
//! A `RecordDescriptor` is the IR form of one generated record type: the
//! `T_<NAMESPACE>_<MESSAGE>` type name plus ordered field names. The IR is
//! plain serializable data, so tests can inspect what would be generated
//! without comparing emitted source text.
//!
//! `DecodedRecord` is the runtime value for one decode call: one f64 per
//! field, zero-initialized on construction, written during a single decode
//! call and read-only afterward.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// IR description of one synthesized record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDescriptor {
    /// Record type name, `T_<NAMESPACE>_<MESSAGE>`
    pub type_name: String,
    /// Field names in signal declaration order (UPPERCASE canonical)
    pub fields: Vec<String>,
}

/// One decoded record instance
///
/// Field values live in signal declaration order, parallel to the
/// descriptor's field list. Plain value type: cloneable, comparable, no
/// shared mutable state.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    descriptor: Arc<RecordDescriptor>,
    values: Vec<f64>,
}

impl DecodedRecord {
    /// Construct a zero-initialized record for a descriptor
    pub fn new(descriptor: Arc<RecordDescriptor>) -> Self {
        Self {
            values: vec![0.0; descriptor.fields.len()],
            descriptor,
        }
    }

    /// Record type name
    pub fn type_name(&self) -> &str {
        &self.descriptor.type_name
    }

    /// The descriptor this record was built from
    pub fn descriptor(&self) -> &RecordDescriptor {
        &self.descriptor
    }

    /// Field value by UPPERCASE canonical name
    pub fn get(&self, field: &str) -> Option<f64> {
        let index = self.descriptor.fields.iter().position(|f| f == field)?;
        Some(self.values[index])
    }

    /// Field values in declaration order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate `(field name, value)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.descriptor
            .fields
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub(crate) fn set(&mut self, index: usize, value: f64) {
        self.values[index] = value;
    }
}

/// Human-readable dump: type name header, then one indented `FIELD:value`
/// line per field in declaration order. Does not mutate state.
impl fmt::Display for DecodedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.descriptor.type_name)?;
        for (name, value) in self.iter() {
            writeln!(f, "    {}:{}", name, value)?;
        }
        Ok(())
    }
}
