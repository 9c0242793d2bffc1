//! Formatting check through an external [`Formatter`].
//!
//! The formatter only validates: its output is discarded and the code passes
//! through untouched, so line numbers in earlier diagnostics stay valid.

use bosw_core::{Diagnostic, Formatter, StageOutput};

pub const STAGE_ID: &str = "format.check";

/// Parser hint handed to the formatter
pub const FORMAT_PARSER: &str = "babel";

pub async fn format(code: &str, formatter: &dyn Formatter) -> StageOutput {
    let mut out = StageOutput::new(code);

    if let Err(e) = formatter.format(code, FORMAT_PARSER).await {
        tracing::warn!(stage = STAGE_ID, error = %e, "formatter rejected code");
        let message = if e.message.is_empty() {
            "Something went wrong while formatting".to_string()
        } else {
            e.message
        };
        out.logs.push(Diagnostic::error(message));
    }

    out
}
