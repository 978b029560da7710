//! blind-review CLI - terminal front end for blind image review sessions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;

/// Blind image review: shuffled reference/candidate pairs, three scores each.
#[derive(Parser)]
#[command(name = "blind-review")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the collections come from.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Review configuration (JSON)
    #[arg(short, long, conflicts_with_all = ["reference", "candidate"])]
    config: Option<PathBuf>,

    /// Reference image directory
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Candidate directory, optionally as LABEL=DIR (repeatable)
    #[arg(long)]
    candidate: Vec<String>,

    /// Shuffle seed (overrides the configuration)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the shuffled review order
    Plan {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Run an interactive review in the terminal
    Review {
        #[command(flatten)]
        source: SourceArgs,

        /// Previous export to resume from
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Where to write the export (default: configured file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show per-folder statistics of an export
    Summary {
        /// Exported workbook or CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Write a review configuration file
    InitConfig {
        #[command(flatten)]
        source: SourceArgs,

        /// Export file name stored in the configuration
        #[arg(long)]
        export_name: Option<String>,

        /// Output configuration file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Plan { source } => commands::plan::run(&source),
        Commands::Review { source, resume, output } => {
            commands::review::run(&source, resume, output)
        }
        Commands::Summary { input, json } => commands::summary::run(input, json),
        Commands::InitConfig { source, export_name, output } => {
            commands::config::init(&source, export_name, output)
        }
    }
}
