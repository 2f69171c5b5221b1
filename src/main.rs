use clap::Parser;
use payload_query::{EngineConfig, ExpressionEngine, PayloadContext};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;

/// Evaluate xpath:/jsonpath: pipelines against an XML or JSON payload.
#[derive(Parser, Debug)]
#[command(name = "payload-query", version, about)]
struct Cli {
    /// Declared payload type: application/xml, text/xml or application/json
    #[arg(short = 't', long, default_value = "application/json")]
    content_type: String,

    /// Read the payload from this file instead of stdin
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// JSON engine configuration, e.g. {"maxStages": 8}
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report failing expressions and continue with the rest
    #[arg(long)]
    keep_going: bool,

    /// Expressions such as "xpath://data/text() | extractAsJSON | jsonpath:name"
    #[arg(required = true)]
    expressions: Vec<String>,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Query(#[from] payload_query::Error),
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when `--keep-going` skipped over failures.
fn run(cli: &Cli) -> Result<bool, CliError> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    let engine = Arc::new(ExpressionEngine::builder().with_config(config).build());

    let payload = match &cli.file {
        Some(path) => fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    let ctx = PayloadContext::new(payload, cli.content_type.as_str(), engine);

    let mut all_ok = true;
    for expression in &cli.expressions {
        match ctx.evaluate(expression) {
            Ok(result) => println!("{} => {} ({})", expression, result, result.result_type()),
            Err(e) if cli.keep_going => {
                eprintln!("{} => error: {}", expression, e);
                all_ok = false;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(all_ok)
}
