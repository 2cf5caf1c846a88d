mod aiger;
mod config;
mod pipeline;
pub mod results;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pipeline::{CircuitArgs, RunArgs};

/// abc-flow: scripted ABC logic-optimization flows with per-step circuit statistics.
#[derive(Parser)]
#[command(name = "abc-flow", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands for running flows, single snapshots, equivalence checks and netlist counts.
#[derive(Subcommand)]
enum Command {
    /// Load a circuit and run an optimization flow over it.
    Run {
        /// Path to flow config TOML file. Uses the built-in balance/rewrite flow when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Circuit file to load (any format ABC's `read` accepts).
        #[arg(long)]
        circuit: PathBuf,
        /// Override the ABC executable.
        #[arg(long)]
        executable: Option<PathBuf>,
        /// Record a stats snapshot after every step.
        #[arg(long, conflicts_with = "no_train")]
        train: bool,
        /// Only record stats for explicit `stats` steps.
        #[arg(long)]
        no_train: bool,
        /// Write the per-step report as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Load a circuit and print its statistics.
    Stats {
        #[arg(long)]
        circuit: PathBuf,
        #[arg(long)]
        executable: Option<PathBuf>,
    },
    /// Rewrite a circuit once and check equivalence against the original.
    Cec {
        #[arg(long)]
        circuit: PathBuf,
        #[arg(long)]
        executable: Option<PathBuf>,
    },
    /// Print total nodes, total edges and NOT gates of an AIGER file.
    AigStats {
        /// Binary (`.aig`) or ASCII (`.aag`) AIGER file.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries results (aig-stats output is machine-read).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            circuit,
            executable,
            train,
            no_train,
            json,
        } => {
            let training = match (train, no_train) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            pipeline::run_flow(RunArgs {
                config,
                circuit,
                executable,
                training,
                json,
            })
            .await
        }
        Command::Stats {
            circuit,
            executable,
        } => pipeline::run_stats(CircuitArgs {
            circuit,
            executable,
        })
        .await,
        Command::Cec {
            circuit,
            executable,
        } => pipeline::run_cec(CircuitArgs {
            circuit,
            executable,
        })
        .await,
        Command::AigStats { file } => pipeline::run_aig_stats(file),
    }
}
