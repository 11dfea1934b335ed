//! Flowcast - command-line access to ensemble streamflow forecasts.

use anyhow::{Context, Result};
use chrono::Duration;
use clap::{Args as ClapArgs, Parser, Subcommand};
use flowcast::config::{
    EnumerateOptions, ProductConfig, ReachCheck, DEFAULT_MAX_RESULTS, MOST_RECENT,
};
use flowcast::query::{get_hydrograph, list_available_cycles};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "flowcast")]
#[command(about = "Ensemble streamflow forecast lookup and aggregation", long_about = None)]
struct Args {
    /// Enable logging to specified file
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    #[command(flatten)]
    product: ProductArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List forecast cycles with data for a reach, newest first
    Cycles {
        #[command(flatten)]
        target: TargetArgs,

        /// Maximum number of cycles to list
        #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
        max_results: usize,

        /// Only list cycles whose files contain the reach
        #[arg(long)]
        verify_reach: bool,
    },
    /// Ensemble statistics for a reach over one forecast cycle
    Hydrograph {
        #[command(flatten)]
        target: TargetArgs,

        /// Cycle directory name, or most_recent
        #[arg(long, default_value = MOST_RECENT)]
        cycle: String,

        /// Reach index from a previous query, checked before use
        #[arg(long)]
        guess_index: Option<usize>,
    },
}

#[derive(ClapArgs, Debug)]
struct TargetArgs {
    /// Directory holding one folder per watershed
    #[arg(long)]
    root: PathBuf,

    /// Watershed name
    #[arg(long)]
    watershed: String,

    /// Subbasin name
    #[arg(long)]
    subbasin: String,

    /// Reach identifier
    #[arg(long)]
    reach_id: String,
}

#[derive(ClapArgs, Debug)]
struct ProductArgs {
    /// Fine-step values at the head of every ensemble member
    #[arg(long, global = true)]
    fine_prefix_len: Option<usize>,

    /// Members below this index extend into the coarse segment
    #[arg(long, global = true)]
    coarse_member_limit: Option<u32>,

    /// Member index of the high-resolution deterministic run
    #[arg(long, global = true)]
    high_res_member: Option<u32>,

    /// Hours between fine-segment values
    #[arg(long, global = true)]
    fine_step_hours: Option<i64>,

    /// Hours between coarse-segment values
    #[arg(long, global = true)]
    coarse_step_hours: Option<i64>,

    /// Hours between auxiliary product values
    #[arg(long, global = true)]
    auxiliary_step_hours: Option<i64>,

    /// Multiplier converting auxiliary discharge into ensemble units
    #[arg(long, global = true)]
    auxiliary_unit_factor: Option<f64>,

    /// Name of the discharge variable
    #[arg(long, global = true)]
    discharge_variable: Option<String>,
}

impl ProductArgs {
    fn into_config(self) -> ProductConfig {
        let mut config = ProductConfig::default();
        if let Some(v) = self.fine_prefix_len {
            config.fine_prefix_len = v;
        }
        if let Some(v) = self.coarse_member_limit {
            config.coarse_member_limit = v;
        }
        if let Some(v) = self.high_res_member {
            config.high_res_member = v;
        }
        if let Some(v) = self.fine_step_hours {
            config.fine_step = Duration::hours(v);
        }
        if let Some(v) = self.coarse_step_hours {
            config.coarse_step = Duration::hours(v);
        }
        if let Some(v) = self.auxiliary_step_hours {
            config.auxiliary_step = Duration::hours(v);
        }
        if let Some(v) = self.auxiliary_unit_factor {
            config.auxiliary_unit_factor = v;
        }
        if let Some(v) = self.discharge_variable {
            config.discharge_variable = v;
        }
        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // File logging gets everything; otherwise stderr honors RUST_LOG
    if let Some(log_path) = &args.log {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .with_writer(Mutex::new(log_file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    tracing::info!("Starting Flowcast");

    let config = args.product.into_config();

    let success = match args.command {
        Command::Cycles {
            target,
            max_results,
            verify_reach,
        } => {
            let options = EnumerateOptions {
                max_results,
                reach_check: if verify_reach {
                    ReachCheck::ResolveReach
                } else {
                    ReachCheck::FilesOnly
                },
            };
            let response = list_available_cycles(
                &target.root,
                &target.watershed,
                &target.subbasin,
                &target.reach_id,
                &options,
                &config,
            );
            print_json(&response)?;
            response.is_success()
        }
        Command::Hydrograph {
            target,
            cycle,
            guess_index,
        } => {
            let response = get_hydrograph(
                &target.root,
                &target.watershed,
                &target.subbasin,
                &target.reach_id,
                &cycle,
                guess_index,
                &config,
            );
            if let Some(message) = response.error_message() {
                tracing::warn!(%message, "Hydrograph query failed");
            }
            print_json(&response)?;
            response.is_success()
        }
    };

    tracing::info!("Flowcast exited");

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
