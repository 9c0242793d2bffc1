//! bosw command line: transform one widget source file.
use anyhow::{Context, Result};
use bosw_core::{PipelineOutput, ReferenceParams, TranspileOptions};
use bosw_stages::{default_runner, CommandFormatter, CommandTranspiler, PipelineRunner};
use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::AsyncReadExt;

/// Exit status when `--deny-errors` finds an error diagnostic
pub const EXIT_DENIED: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "bosw",
    version,
    about = "Strip directive comments, transpile and resolve @{...} references in widget source"
)]
pub struct Cli {
    /// Source file to transform ("-" reads stdin)
    pub input: PathBuf,

    /// YAML or JSON file with config, modules, ipfsMap, ipfsGateway and aliases
    #[arg(short, long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Run the TypeScript/JSX transpiler
    #[arg(long)]
    pub typescript: bool,

    /// tsconfig JSON whose compilerOptions extend the transpiler options
    #[arg(long, value_name = "FILE")]
    pub tsconfig: Option<PathBuf>,

    /// Skip the formatting check
    #[arg(long)]
    pub no_format: bool,

    /// Transpiler command reading source on stdin, e.g. "node transpile.js"
    #[arg(long, value_name = "CMD")]
    pub transpiler: Option<String>,

    /// Formatter command reading source on stdin, e.g. "prettier --parser {parser}"
    #[arg(long, value_name = "CMD")]
    pub formatter: Option<String>,

    /// Print code, diagnostics and stage traces as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit with status 2 when any error diagnostic is produced
    #[arg(long)]
    pub deny_errors: bool,

    /// More logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn runner(&self) -> Result<PipelineRunner> {
        let mut runner = default_runner();
        if let Some(cmd) = &self.transpiler {
            let transpiler = CommandTranspiler::parse(cmd).context("--transpiler command is empty")?;
            runner = runner.with_transpiler(transpiler);
        }
        if let Some(cmd) = &self.formatter {
            let formatter = CommandFormatter::parse(cmd).context("--formatter command is empty")?;
            runner = runner.with_formatter(formatter);
        }
        Ok(runner)
    }

    pub fn options(&self) -> Result<TranspileOptions> {
        let ts_config = match &self.tsconfig {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read tsconfig {}", path.display()))?;
                let value = serde_json::from_str(&content)
                    .with_context(|| format!("invalid tsconfig {}", path.display()))?;
                Some(value)
            }
            None => None,
        };

        Ok(TranspileOptions {
            compile_typescript: self.typescript,
            format: !self.no_format,
            ts_config,
        })
    }

    pub fn reference_params(&self) -> Result<ReferenceParams> {
        match &self.params {
            Some(path) => ReferenceParams::load(path)
                .with_context(|| format!("failed to load reference tables from {}", path.display())),
            None => Ok(ReferenceParams::default()),
        }
    }
}

async fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut code = String::new();
        tokio::io::stdin()
            .read_to_string(&mut code)
            .await
            .context("failed to read stdin")?;
        return Ok(code);
    }
    tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))
}

pub async fn run(cli: &Cli) -> Result<ExitCode> {
    let code = read_input(&cli.input).await?;
    let params = cli.reference_params()?;
    let options = cli.options()?;
    let runner = cli.runner()?;

    tracing::debug!(input = %cli.input.display(), ?options, "transforming");
    let output = runner.run(&code, &params, &options).await?;
    report(cli, &output)?;

    if cli.deny_errors && output.has_errors() {
        return Ok(ExitCode::from(EXIT_DENIED));
    }
    Ok(ExitCode::SUCCESS)
}

fn report(cli: &Cli, output: &PipelineOutput) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(output)?);
        return Ok(());
    }
    for log in &output.logs {
        eprintln!("{}", log);
    }
    println!("{}", output.code);
    Ok(())
}
