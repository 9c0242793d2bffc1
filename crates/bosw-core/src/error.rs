//! Unified Error Model
use thiserror::Error;

/// Hard failures of a pipeline call. Everything else is a diagnostic.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("SCAN/{0}")]
    CommentScan(#[from] ScanError),

    #[error("CONFIG/{0}")]
    Config(String),

    #[error("IO/{0}")]
    Io(#[from] std::io::Error),
}

/// The comment scanner could not make sense of the source at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("unterminated block comment opened on line {line}")]
    UnterminatedBlockComment { line: usize },

    #[error("unterminated {kind} literal opened on line {line}")]
    UnterminatedLiteral { kind: &'static str, line: usize },
}

/// Failure reported by an external transpiler or formatter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AdapterError {
    pub message: String,
}

impl AdapterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
