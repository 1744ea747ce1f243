//! CLI entry point for the sharebook rebalancer.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use sharebook_rebalancer::config::{Config, OutputFormat};
use sharebook_rebalancer::error::Error;
use sharebook_rebalancer::execution::{self, RunOptions};
use sharebook_rebalancer::target::TargetSpec;

#[derive(Parser)]
#[command(name = "rebalancer")]
#[command(about = "Whole-share portfolio rebalancer")]
#[command(version)]
struct Cli {
    /// Path to config.toml (defaults apply if missing)
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the holdings file from the config
    #[arg(long)]
    holdings: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the buy/sell list for a target allocation
    Run {
        /// Path to target.json
        target: PathBuf,
    },

    /// Show the full sizing table, including rejected plans
    Plan {
        /// Path to target.json
        target: PathBuf,
    },

    /// Show current holdings and allocations
    Positions,
}

fn load_target(path: &Path) -> TargetSpec {
    match TargetSpec::load(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading target: {e}");
            process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let mut config = match Config::load_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };
    if let Some(path) = cli.holdings {
        config.portfolio.holdings = path.display().to_string();
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .format_timestamp_secs()
    .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        config.output.format
    };

    let result = match cli.command {
        Command::Run { target } => {
            let spec = load_target(&target);
            let opts = RunOptions {
                format,
                target_file: target.display().to_string(),
            };
            execution::run(&config, &spec, &opts)
        }
        Command::Plan { target } => {
            let spec = load_target(&target);
            execution::show_plan(&config, &spec, format)
        }
        Command::Positions => execution::show_positions(&config, format),
    };

    if let Err(e) = result {
        match &e {
            Error::Rebalance(err) => {
                eprintln!("\nRejected: {err}");
                process::exit(2);
            }
            _ => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}
