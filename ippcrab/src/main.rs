//! IPPcrab Interpreter
//!
//! Runs an IPPcode23 program given in its XML representation. The process
//! exit code is the program's `EXIT` code, or the code of the first error.

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use ippcrab::execute;
use std::fs;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing::{debug, info};

/// Exit code for invalid command line arguments.
const USAGE_ERROR: u8 = 10;
/// Exit code for an input file that cannot be opened or read.
const INPUT_FILE_ERROR: u8 = 11;
/// Exit code for any other I/O failure.
const IO_ERROR: u8 = 99;

#[derive(Parser, Debug)]
#[command(name = "ippcrab", version)]
#[command(about = "Interpreter of IPPcode23 programs in XML representation")]
#[command(group(ArgGroup::new("files").required(true).multiple(true).args(["source", "input"])))]
struct Cli {
    /// XML source of the program; read from standard input when omitted
    #[arg(short, long, value_name = "FILE")]
    source: Option<PathBuf>,

    /// Input for READ instructions; read from standard input when omitted
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,
}

#[derive(Debug, Error)]
#[error("cannot read `{}`", .path.display())]
struct CliError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

fn main() -> ExitCode {
    let log_level = std::env::var("IPPCRAB_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(USAGE_ERROR)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&cli) {
        Ok(code) => {
            info!("Interpretation finished with exit code {code}");
            ExitCode::from(code)
        }
        Err(err) => {
            debug!("Interpretation failed: {err:?}");
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let source = match &cli.source {
        Some(path) => read_file(path)?,
        None => {
            let mut source = Vec::new();
            io::stdin()
                .read_to_end(&mut source)
                .context("cannot read the program from standard input")?;
            source
        }
    };

    let stdout = io::stdout();
    let mut output = stdout.lock();
    let mut diagnostics = io::stderr();
    let code = match &cli.input {
        Some(path) => {
            let file = fs::File::open(path).map_err(|source| CliError {
                path: path.clone(),
                source,
            })?;
            execute(
                &source,
                &mut BufReader::new(file),
                &mut output,
                &mut diagnostics,
            )
        }
        None => execute(
            &source,
            &mut io::stdin().lock(),
            &mut output,
            &mut diagnostics,
        ),
    };
    Ok(code)
}

/// Reads the raw program text; decoding it is up to the loader.
fn read_file(path: &Path) -> Result<Vec<u8>> {
    let content = fs::read(path).map_err(|source| CliError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content)
}

/// Recovers the exit code carried by an error chain.
///
/// Program errors never get here, `execute` reports them itself.
fn exit_code(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<CliError>().is_some() {
        INPUT_FILE_ERROR
    } else {
        IO_ERROR
    }
}
