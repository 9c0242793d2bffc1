//! bosw stages: the transformation steps and the runner that chains them.
//!
//! # Pipeline Flow
//!
//! ```text
//! Source → Extract → Transpile? → Resolve → Format? → Output
//!            ↓           ↓            ↓          ↓
//!       Directives    return x     @{...}     checked
//! ```
//!
//! A `@skip` directive stops the flow right after transpilation. Each stage
//! appends to one ordered diagnostic log.

pub mod command;
pub mod comments;
pub mod extract_directives;
pub mod format;
pub mod resolve_refs;
pub mod runner;
pub mod transpile_ts;

pub use command::{CommandFormatter, CommandTranspiler};
pub use comments::JsCommentScanner;
pub use extract_directives::extract_config_comments;
pub use format::format;
pub use resolve_refs::{eval_custom_syntax, Keyword, Resolution};
pub use runner::PipelineRunner;
pub use transpile_ts::transpile_typescript;

use bosw_core::{PipelineError, PipelineOutput, ReferenceParams, TranspileOptions};

/// Runner with the JS comment scanner and no external converters.
pub fn default_runner() -> PipelineRunner {
    PipelineRunner::new(JsCommentScanner)
}

/// One-shot transform with [`default_runner`].
pub async fn transpile_js(
    code: &str,
    params: &ReferenceParams,
    options: &TranspileOptions,
) -> Result<PipelineOutput, PipelineError> {
    default_runner().run(code, params, options).await
}
