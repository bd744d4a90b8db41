use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod config;
mod pipeline;
mod runner;

use config::VeriteeConfig;

#[derive(Parser)]
#[command(name = "veritee")]
#[command(about = "Generates and verifies TEE computation claims", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file override
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the verification pipeline over the work directory
    Run {
        /// Supervised computation program (overrides config)
        #[arg(long)]
        program: Option<PathBuf>,

        /// Directory to poll for pending work units (overrides config)
        #[arg(long)]
        work_dir: Option<PathBuf>,

        /// Keep processing after a failed verification instead of stopping
        #[arg(long)]
        keep_going: bool,
    },

    /// Verify a single work-unit file
    Verify {
        /// Work-unit JSON file
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a work-unit file from computation inputs and raw evidence
    Generate {
        /// Computation identifier
        #[arg(long, default_value = "block_processing_kreth")]
        computation: String,

        /// Computation input JSON file
        #[arg(long)]
        input: PathBuf,

        /// Computation result JSON file
        #[arg(long)]
        result: PathBuf,

        /// Raw attestation evidence file
        #[arg(long)]
        evidence: PathBuf,

        /// Freshness nonce (random UUID if not specified)
        #[arg(long)]
        nonce: Option<String>,

        /// Where to write the work-unit file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    let config = VeriteeConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            program,
            work_dir,
            keep_going,
        } => {
            cli::run::execute(&config, program, work_dir, keep_going).await?;
        }
        Commands::Verify { file, json } => {
            cli::verify::execute(&config, &file, json)?;
        }
        Commands::Generate {
            computation,
            input,
            result,
            evidence,
            nonce,
            output,
        } => {
            cli::generate::execute(&computation, &input, &result, &evidence, nonce, &output)?;
        }
    }

    Ok(())
}
