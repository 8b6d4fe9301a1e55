//! Command-line entry point for the generator-to-iterator compiler.
//!
//! Reads a Java compilation unit from a file or standard input, rewrites its
//! `generate` method into an external iterator class, and writes the result
//! to a file or standard output. All diagnostics go to standard error;
//! standard output carries nothing but generated code.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use geniter_core::GeniterPipeline;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "geniter",
    version,
    about = "Compiles a Java generator method into an external iterator class"
)]
struct Cli {
    /// Input file (reads standard input when omitted)
    file: Option<PathBuf>,

    /// Write output to FILE instead of standard output
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the parsed compilation unit as JSON and exit
    #[arg(long)]
    dump_ast: bool,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let source = read_input(cli.file.as_deref())?;
    let pipeline = GeniterPipeline::new();

    if cli.dump_ast {
        info!("dumping parsed AST");
        let unit = pipeline.parse(&source)?;
        let json = serde_json::to_string_pretty(&unit)?;
        return write_output(cli.output.as_deref(), &json);
    }

    info!("transforming generator");
    let java = pipeline.transpile(&source)?;
    write_output(cli.output.as_deref(), &java)?;
    info!("done");
    Ok(())
}

fn read_input(path: Option<&std::path::Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("reading standard input")?;
            Ok(source)
        }
    }
}

fn write_output(path: Option<&std::path::Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("writing {}", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}
