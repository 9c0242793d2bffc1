//! Reference resolution for `@{keyword/path}` expressions.
//!
//! ```text
//! const hello = "Hello, @{alias/name}!";
//! const utils = VM.require(`@{module/utils/name}`);
//! const logo = <img src="@{ipfs/brand/logo.svg}" />;
//! const signer = "by @{config/accounts/signer}";
//! ```
//!
//! Every match is rewritten in a single pass, so resolved values are never
//! scanned again.

use bosw_core::{Diagnostic, ReferenceParams, StageOutput};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

pub const STAGE_ID: &str = "resolve.references";

pub const MARKER: char = '@';
pub const SEPARATOR: char = '/';
pub const WRAPPER: (char, char) = ('{', '}');

static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@\{([^}]+)\}").expect("reference pattern is valid"));

/// Resolver selected by the first segment of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Config,
    Module,
    Ipfs,
    Alias,
}

impl Keyword {
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "config" => Some(Self::Config),
            "module" => Some(Self::Module),
            "ipfs" => Some(Self::Ipfs),
            "alias" => Some(Self::Alias),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Module => "module",
            Self::Ipfs => "ipfs",
            Self::Alias => "alias",
        }
    }

    pub fn resolve(&self, path: &[&str], params: &ReferenceParams) -> Resolution {
        match self {
            Self::Config => eval_config(path, &params.config),
            Self::Module => eval_module(path, &params.modules, params.deploy_account()),
            Self::Ipfs => eval_ipfs(path, &params.ipfs_map, &params.ipfs_gateway),
            Self::Alias => eval_alias(path, &params.aliases),
        }
    }
}

/// Replacement text for one reference plus what went wrong finding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub value: String,
    pub logs: Vec<Diagnostic>,
}

impl Resolution {
    fn found(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            logs: Vec::new(),
        }
    }

    fn missing(value: String, message: String) -> Self {
        Self {
            value,
            logs: vec![Diagnostic::warn(message)],
        }
    }
}

/// Re-encode a path as a reference expression, e.g. `@{ipfs/logo.svg}`.
pub fn wrap(path: &str, scope: &str) -> String {
    format!(
        "{}{}{}{}{}{}",
        MARKER, WRAPPER.0, scope, SEPARATOR, path, WRAPPER.1
    )
}

fn join(path: &[&str]) -> String {
    path.join(&SEPARATOR.to_string())
}

pub fn eval_config(path: &[&str], config: &Value) -> Resolution {
    // `@{config/account}` is shorthand for the deploying account
    let path: &[&str] = match path.first() {
        Some(&"account") => &["accounts", "deploy"][..],
        _ => path,
    };

    match lookup(config, path) {
        Some(value) => Resolution::found(render(value)),
        None => {
            let placeholder = wrap(&join(path), Keyword::Config.as_str());
            let message = format!("Config value not found: {}", placeholder);
            Resolution::missing(placeholder, message)
        }
    }
}

/// Walk one key per segment. An empty path finds nothing.
fn lookup<'a>(tree: &'a Value, path: &[&str]) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    path.iter().try_fold(tree, |node, key| match node {
        Value::Object(map) => map.get(*key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn eval_module(path: &[&str], modules: &BTreeSet<String>, account: &str) -> Resolution {
    let module_path = path.join(".");
    let value = format!("{}/widget/{}.module", account, module_path);

    if modules.contains(&module_path) {
        Resolution::found(value)
    } else {
        let message = format!(
            "Imported module not found locally: {}",
            wrap(&join(path), Keyword::Module.as_str())
        );
        Resolution::missing(value, message)
    }
}

pub fn eval_ipfs(path: &[&str], ipfs_map: &HashMap<String, String>, gateway: &str) -> Resolution {
    let ipfs_path = join(path);

    match ipfs_map.get(&ipfs_path) {
        Some(cid) => {
            let base = gateway.strip_suffix('/').unwrap_or(gateway);
            Resolution::found(format!("{}/{}", base, cid))
        }
        None => {
            let placeholder = wrap(&ipfs_path, Keyword::Ipfs.as_str());
            let message = format!("IPFS file or mapping not found: {}", placeholder);
            Resolution::missing(placeholder, message)
        }
    }
}

pub fn eval_alias(path: &[&str], aliases: &HashMap<String, String>) -> Resolution {
    let alias_path = join(path);

    match aliases.get(&alias_path) {
        Some(value) => Resolution::found(value.as_str()),
        None => {
            let placeholder = wrap(&alias_path, Keyword::Alias.as_str());
            let message = format!("Imported alias not found: {}", placeholder);
            Resolution::missing(placeholder, message)
        }
    }
}

/// Replace every reference expression in `code`.
pub fn eval_custom_syntax(code: &str, params: &ReferenceParams) -> StageOutput {
    let mut logs = Vec::new();

    let code = REFERENCE
        .replace_all(code, |captures: &Captures| {
            let mut segments = captures[1].split(SEPARATOR);
            let keyword = segments.next().unwrap_or_default();
            let path: Vec<&str> = segments.collect();

            let resolution = match Keyword::parse(keyword) {
                Some(keyword) => keyword.resolve(&path, params),
                // unknown keywords keep the expression as written
                None => Resolution::missing(
                    captures[0].to_string(),
                    format!("Unknown keyword: {}", keyword),
                ),
            };

            logs.extend(resolution.logs);
            resolution.value
        })
        .into_owned();

    StageOutput { code, logs }
}
