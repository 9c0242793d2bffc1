//! bosw core: data model, resolver tables and collaborator contracts
//!
//! Everything the transformation stages share lives here: the diagnostic
//! log, extracted directives, the caller-supplied reference tables, and the
//! traits behind which the external comment scanner, transpiler and
//! formatter are plugged in.

pub mod context;
pub mod data_model;
pub mod error;
pub mod stage;

pub use context::{ReferenceParams, TranspileOptions};
pub use data_model::{
    Diagnostic, Directive, ExtractOutput, Level, PipelineOutput, StageOutput, StageTrace,
};
pub use error::{AdapterError, PipelineError, ScanError};
pub use stage::{Comment, CommentMap, CommentScanner, Formatter, Transpiler, TranspilerOptions};
