//! Generator configuration
//!
//! The original tooling this design descends from baked a single global
//! namespace prefix into symbol generation; here the prefix is an explicit
//! per-run value threaded through compilation.

use serde::{Deserialize, Serialize};

/// Configuration for one generation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Prefix prepended to every namespace symbol (empty = no prefix)
    #[serde(default)]
    pub namespace_prefix: String,
}

impl GeneratorConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the namespace prefix
    pub fn with_namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_prefix = prefix.into();
        self
    }

    /// Raw namespace name for a database, prefix applied
    pub fn namespace_name(&self, database_name: &str) -> String {
        if self.namespace_prefix.is_empty() {
            database_name.to_string()
        } else {
            format!("{}_{}", self.namespace_prefix, database_name)
        }
    }
}
