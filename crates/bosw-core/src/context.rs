//! Reference tables and per-call options
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Lookup tables used to resolve `@{keyword/path}` references.
///
/// Supplied by the caller for every pipeline call and never mutated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceParams {
    /// Nested build/deploy configuration tree
    #[serde(default)]
    pub config: Value,
    /// Dotted module paths known to exist locally
    #[serde(default)]
    pub modules: BTreeSet<String>,
    /// Slash-joined asset path -> content address
    #[serde(default)]
    pub ipfs_map: HashMap<String, String>,
    #[serde(default)]
    pub ipfs_gateway: String,
    /// Slash-joined alias path -> replacement text
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl ReferenceParams {
    /// Load tables from a YAML or JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse tables from YAML (JSON documents are accepted too)
    pub fn from_yaml(yaml: &str) -> Result<Self, PipelineError> {
        serde_yaml::from_str(yaml).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// The deploying account, `config.accounts.deploy`, or empty.
    pub fn deploy_account(&self) -> &str {
        self.config
            .get("accounts")
            .and_then(|accounts| accounts.get("deploy"))
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}

/// Per-call pipeline switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranspileOptions {
    #[serde(default, rename = "compileTypeScript")]
    pub compile_typescript: bool,
    #[serde(default = "default_format")]
    pub format: bool,
    /// tsconfig-like document; its `compilerOptions` extend the transpiler options
    #[serde(default, rename = "tsConfig", skip_serializing_if = "Option::is_none")]
    pub ts_config: Option<Value>,
}

fn default_format() -> bool {
    true
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            compile_typescript: false,
            format: true,
            ts_config: None,
        }
    }
}
