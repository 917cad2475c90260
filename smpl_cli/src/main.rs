//! smplc — the smpl compiler command-line interface
//!
//! Compiles one smpl source file into SSA form, prints the IR dump to
//! stdout, and optionally writes a parse-trace debug dump and a Graphviz
//! rendering of the block graph.

use anyhow::{Context, Result};
use clap::Parser;
use smpl_parser::ParseTrace;
use std::path::PathBuf;

/// The smpl compiler front-end
#[derive(Parser)]
#[command(name = "smplc")]
#[command(about = "Compile smpl source to SSA intermediate representation")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// smpl source file to compile
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Write a parse-trace debug dump to this path
    #[arg(short = 'd', long = "debug-dump")]
    debug_dump: Option<PathBuf>,

    /// Write a Graphviz rendering of the IR to this path
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let text = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let file_name = cli.input.display().to_string();

    let trace = cli.debug_dump.as_ref().map(|_| ParseTrace::new());
    let result = smpl_parser::compile_source_traced(&text, &file_name, trace.clone());

    // the trace is written even when compilation fails, to show how far the
    // parser got
    if let (Some(path), Some(trace)) = (&cli.debug_dump, &trace) {
        std::fs::write(path, trace.render())
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    match result {
        Ok(compilation) => {
            for warning in compilation.diagnostics.warnings() {
                eprintln!(
                    "{}\nWARNING: {}",
                    compilation.source.locate(warning.span),
                    warning.message
                );
            }
            print!("{}", compilation.ir.render());
            if let Some(path) = &cli.dot {
                std::fs::write(path, smpl_ssa::dot::render_dot(&compilation.ir))
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    }
}
