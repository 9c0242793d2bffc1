//! Collaborator contracts: comment scanner, transpiler, formatter
use crate::error::{AdapterError, ScanError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A comment found by a [`CommentScanner`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment text without its delimiters
    pub content: String,
    /// First line (1-indexed, inclusive)
    pub begin: usize,
    /// Last line (1-indexed, inclusive)
    pub end: usize,
}

/// Comments keyed by the byte offset where they start, so iteration
/// follows source order.
pub type CommentMap = BTreeMap<usize, Comment>;

/// Finds every comment in a unit of source text.
pub trait CommentScanner: Send + Sync {
    fn scan(&self, source: &str) -> Result<CommentMap, ScanError>;
}

/// Options object handed to the external transpiler.
pub type TranspilerOptions = Map<String, Value>;

/// External source-to-source transpiler (typed/component syntax to plain JS).
#[async_trait]
pub trait Transpiler: Send + Sync {
    async fn transform(
        &self,
        source: &str,
        options: &TranspilerOptions,
    ) -> Result<String, AdapterError>;
}

/// External code formatter.
#[async_trait]
pub trait Formatter: Send + Sync {
    /// `parser` is the language hint (e.g. "babel").
    async fn format(&self, source: &str, parser: &str) -> Result<String, AdapterError>;
}
