//! Transpiler and formatter adapters backed by external programs.
//!
//! Source text goes to the program's stdin and the converted text is read
//! back from stdout. A non-zero exit is reported with the program's stderr.

use async_trait::async_trait;
use bosw_core::{AdapterError, Formatter, Transpiler, TranspilerOptions};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Env var carrying the transpiler options as JSON
pub const TRANSPILER_OPTIONS_ENV: &str = "BOSW_TRANSPILER_OPTIONS";
/// Env var carrying the formatter parser hint
pub const FORMAT_PARSER_ENV: &str = "BOSW_FORMAT_PARSER";

#[derive(Debug, Clone)]
pub struct CommandTranspiler {
    program: String,
    args: Vec<String>,
}

impl CommandTranspiler {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace-separated command line, e.g. `"node transpile.js"`.
    pub fn parse(command_line: &str) -> Option<Self> {
        let (program, args) = split_command(command_line)?;
        Some(Self::new(program, args))
    }
}

#[async_trait]
impl Transpiler for CommandTranspiler {
    async fn transform(
        &self,
        source: &str,
        options: &TranspilerOptions,
    ) -> Result<String, AdapterError> {
        let options = serde_json::to_string(options)
            .map_err(|e| AdapterError::new(format!("failed to encode transpiler options: {}", e)))?;
        run_command(
            &self.program,
            &self.args,
            &[(TRANSPILER_OPTIONS_ENV, options.as_str())],
            source,
        )
        .await
    }
}

/// Arguments equal to `{parser}` are replaced by the parser hint,
/// e.g. `prettier --parser {parser}`.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn parse(command_line: &str) -> Option<Self> {
        let (program, args) = split_command(command_line)?;
        Some(Self::new(program, args))
    }
}

#[async_trait]
impl Formatter for CommandFormatter {
    async fn format(&self, source: &str, parser: &str) -> Result<String, AdapterError> {
        let args: Vec<String> = self
            .args
            .iter()
            .map(|arg| if arg == "{parser}" { parser.to_string() } else { arg.clone() })
            .collect();
        run_command(&self.program, &args, &[(FORMAT_PARSER_ENV, parser)], source).await
    }
}

fn split_command(command_line: &str) -> Option<(String, Vec<String>)> {
    let mut parts = command_line.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

async fn run_command(
    program: &str,
    args: &[String],
    envs: &[(&str, &str)],
    input: &str,
) -> Result<String, AdapterError> {
    tracing::debug!(program, ?args, "spawning external converter");

    let mut child = Command::new(program)
        .args(args)
        .envs(envs.iter().copied())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| AdapterError::new(format!("failed to start `{}`: {}", program, e)))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| AdapterError::new(format!("`{}` has no stdin", program)))?;
    let input = input.to_string();
    // Feed stdin while stdout drains so large sources cannot deadlock.
    let writer = tokio::spawn(async move {
        stdin.write_all(input.as_bytes()).await?;
        stdin.shutdown().await
    });

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| AdapterError::new(format!("`{}` did not finish: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(AdapterError::new(if stderr.is_empty() {
            format!("`{}` exited with {}", program, output.status)
        } else {
            stderr
        }));
    }

    // A program may exit successfully without reading all of its input.
    match writer.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
        Ok(Err(e)) => {
            return Err(AdapterError::new(format!("failed to write to `{}`: {}", program, e)))
        }
        Err(e) => return Err(AdapterError::new(format!("stdin writer for `{}` failed: {}", program, e))),
    }

    String::from_utf8(output.stdout)
        .map_err(|e| AdapterError::new(format!("`{}` produced invalid UTF-8: {}", program, e)))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::transpile_ts::default_transpiler_options;

    #[tokio::test]
    async fn test_cat_round_trips_source() {
        let transpiler = CommandTranspiler::parse("cat").unwrap();
        let out = transpiler
            .transform("export default App;\n", &default_transpiler_options())
            .await
            .unwrap();
        assert_eq!(out, "export default App;\n");
    }

    #[tokio::test]
    async fn test_options_reach_the_program() {
        let transpiler = CommandTranspiler::new(
            "sh",
            vec!["-c".into(), format!("printf '%s' \"${}\"", TRANSPILER_OPTIONS_ENV)],
        );
        let out = transpiler
            .transform("", &default_transpiler_options())
            .await
            .unwrap();
        let options: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(options["jsxRuntime"], "preserve");
    }

    #[tokio::test]
    async fn test_parser_placeholder() {
        let formatter = CommandFormatter::parse("echo {parser}").unwrap();
        assert_eq!(formatter.format("x", "babel").await.unwrap(), "babel\n");
    }

    #[tokio::test]
    async fn test_failure_carries_stderr() {
        let formatter = CommandFormatter::new(
            "sh",
            vec!["-c".into(), "cat >/dev/null; echo 'SyntaxError: Unexpected token' >&2; exit 2".into()],
        );
        let err = formatter.format("(", "babel").await.unwrap_err();
        assert_eq!(err.message, "SyntaxError: Unexpected token");
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = CommandTranspiler::parse("bosw-definitely-not-installed")
            .unwrap()
            .transform("x", &TranspilerOptions::new())
            .await
            .unwrap_err();
        assert!(err.message.starts_with("failed to start `bosw-definitely-not-installed`"));
    }

    #[test]
    fn test_empty_command_line() {
        assert!(CommandTranspiler::parse("   ").is_none());
    }
}
