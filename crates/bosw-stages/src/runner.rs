//! Pipeline Runner: extract → transpile → resolve → format
use crate::{extract_directives, format, resolve_refs, transpile_ts};
use bosw_core::{
    CommentScanner, Diagnostic, Formatter, PipelineError, PipelineOutput, ReferenceParams,
    StageOutput, StageTrace, TranspileOptions, Transpiler,
};
use std::time::Instant;
use tracing::Instrument;

pub struct PipelineRunner {
    scanner: Box<dyn CommentScanner>,
    transpiler: Option<Box<dyn Transpiler>>,
    formatter: Option<Box<dyn Formatter>>,
}

impl PipelineRunner {
    pub fn new(scanner: impl CommentScanner + 'static) -> Self {
        Self {
            scanner: Box::new(scanner),
            transpiler: None,
            formatter: None,
        }
    }

    pub fn with_transpiler(mut self, transpiler: impl Transpiler + 'static) -> Self {
        self.transpiler = Some(Box::new(transpiler));
        self
    }

    pub fn with_formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Some(Box::new(formatter));
        self
    }

    /// Transform one unit of source.
    ///
    /// Only a comment scanner failure is returned as an error; every other
    /// problem ends up in the diagnostic log.
    pub async fn run(
        &self,
        code: &str,
        params: &ReferenceParams,
        options: &TranspileOptions,
    ) -> Result<PipelineOutput, PipelineError> {
        let span = tracing::info_span!("transpile", run_id = %uuid::Uuid::new_v4());
        self.run_stages(code, params, options).instrument(span).await
    }

    async fn run_stages(
        &self,
        code: &str,
        params: &ReferenceParams,
        options: &TranspileOptions,
    ) -> Result<PipelineOutput, PipelineError> {
        let mut logs = Vec::new();
        let mut stages = Vec::new();

        let start = Instant::now();
        let extracted = extract_directives::extract_config_comments(code, self.scanner.as_ref())?;
        stages.push(trace(
            extract_directives::STAGE_ID,
            code,
            &extracted.code,
            extracted.logs.len(),
            start,
        ));
        logs.extend(extracted.logs);
        let directives = extracted.configs;
        let mut current = extracted.code;
        tracing::debug!(directives = directives.len(), "directives extracted");

        if options.compile_typescript {
            let start = Instant::now();
            let out = match &self.transpiler {
                Some(transpiler) => {
                    let ts_config = options.ts_config.as_ref();
                    transpile_ts::transpile_typescript(&current, transpiler.as_ref(), ts_config).await
                }
                None => StageOutput::new(current.as_str())
                    .with_log(Diagnostic::error("No TypeScript transpiler configured")),
            };
            stages.push(trace(transpile_ts::STAGE_ID, &current, &out.code, out.logs.len(), start));
            logs.extend(out.logs);
            current = out.code;
        }

        if let Some(skip) = directives.iter().find(|d| d.name == "skip") {
            tracing::info!(line = skip.begin_line, "skipping compilation");
            logs.push(
                Diagnostic::info("Skipping compilation because of @skip comment")
                    .at_line(skip.begin_line),
            );
            return Ok(PipelineOutput { code: current, logs, stages });
        }

        let start = Instant::now();
        let out = resolve_refs::eval_custom_syntax(&current, params);
        stages.push(trace(resolve_refs::STAGE_ID, &current, &out.code, out.logs.len(), start));
        logs.extend(out.logs);
        current = out.code;

        if options.format {
            match &self.formatter {
                Some(formatter) => {
                    let start = Instant::now();
                    let out = format::format(&current, formatter.as_ref()).await;
                    stages.push(trace(format::STAGE_ID, &current, &out.code, out.logs.len(), start));
                    logs.extend(out.logs);
                    current = out.code;
                }
                None => {
                    tracing::debug!("no formatter configured, skipping format check");
                    logs.push(Diagnostic::info("No formatter configured, format check skipped"));
                }
            }
        }

        Ok(PipelineOutput { code: current, logs, stages })
    }
}

fn trace(id: &str, input: &str, output: &str, diagnostics: usize, start: Instant) -> StageTrace {
    let trace = StageTrace {
        id: id.to_string(),
        in_hash: hash_text(input),
        out_hash: hash_text(output),
        latency_ms: start.elapsed().as_millis() as u64,
        diagnostics,
    };
    tracing::debug!(stage = id, diagnostics, latency_ms = trace.latency_ms, "stage finished");
    trace
}

fn hash_text(text: &str) -> String {
    format!("blake3:{}", blake3::hash(text.as_bytes()))
}
