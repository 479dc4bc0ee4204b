//! mtg-corpus command-line interface

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mtg_corpus::cli::commands::build::{BuildArgs, handle_build};
use mtg_corpus::cli::commands::decode::{DecodeArgs, handle_decode};
use mtg_corpus::cli::commands::status::handle_status;
use mtg_corpus::cli::commands::strip::handle_strip;

#[derive(Parser)]
#[command(name = "mtg-corpus", version, about = "Build and inspect card-generator training corpora")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize, validate, encode and verify a card database
    Build {
        /// TOML build configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Card database (AllPrintings.json)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Stage to run; repeat for several (default: all). Each stage
        /// consumes the previous one's output, so the selection must be a
        /// prefix of normalize, validate, encode, verify.
        #[arg(long = "stage")]
        stages: Vec<String>,
        /// Skip round-trip verification
        #[arg(long)]
        no_verify: bool,
        /// Do not write YAML stage dumps
        #[arg(long)]
        no_yaml: bool,
        /// Encode rules text with reminder text intact
        #[arg(long)]
        keep_reminder_text: bool,
        /// Keep cards whose encoding repeats an earlier one
        #[arg(long)]
        keep_duplicates: bool,
        /// Validate inputs without building
        #[arg(long)]
        dry_run: bool,
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show the manifest of the last build in an output directory
    Status {
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
    },
    /// Decode and validate generated samples
    Decode {
        /// Sample file, or - for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
        /// Print accepted cards as YAML
        #[arg(long)]
        yaml: bool,
        /// Disable the error-correction pre-pass
        #[arg(long)]
        strict: bool,
    },
    /// Remove reminder text from rules text
    Strip {
        /// Text file, or - for stdin
        #[arg(short, long, default_value = "-")]
        input: String,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Build {
            config,
            input,
            output,
            stages,
            no_verify,
            no_yaml,
            keep_reminder_text,
            keep_duplicates,
            dry_run,
            verbose,
        } => handle_build(&BuildArgs {
            config_file: config,
            input,
            output_dir: output,
            stages,
            no_verify,
            no_yaml,
            keep_reminder_text,
            keep_duplicates,
            dry_run,
            verbose,
        })
        .context("corpus build failed"),
        Commands::Status { output } => {
            handle_status(&output).context("could not read build status")
        }
        Commands::Decode {
            input,
            yaml,
            strict,
        } => handle_decode(&DecodeArgs {
            input,
            yaml,
            strict,
        })
        .context("decode failed"),
        Commands::Strip { input } => handle_strip(&input).context("strip failed"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
