//! adjust — drive the load adjuster from the command line.
//!
//! # Usage
//!
//! ```text
//! adjust compute --measurement 0.35 --target 0.2
//! adjust watch --interval-ms 500 --config adjuster.toml
//! adjust simulate --steps 20 --seed 7
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use adjust_core::{AdjusterOptions, MeasurementPolicy};

mod commands;

#[derive(Parser)]
#[command(
    name = "adjust",
    about = "Feedback-loop scale recommendations for load control",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute one recommendation.
    ///
    /// Without --measurement, samples this process's CPU utilization.
    Compute {
        #[arg(short, long)]
        measurement: Option<f64>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Sample process CPU utilization on a timer and steer a notional
    /// concurrency limit with the recommendations. Stops on Ctrl-C.
    Watch {
        #[arg(long, default_value = "1000")]
        interval_ms: u64,
        /// Starting concurrency limit.
        #[arg(long, default_value = "16")]
        initial_limit: f64,
        /// Upper bound on the concurrency limit.
        #[arg(long, default_value = "1024")]
        max_limit: f64,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Feed a simulated herd and watch the adjuster settle food on target.
    Simulate {
        #[arg(long, default_value = "20")]
        steps: u32,
        /// RNG seed for reproducible hunger jitter.
        #[arg(long)]
        seed: Option<u64>,
        /// Delay between steps.
        #[arg(long, default_value = "0")]
        interval_ms: u64,
        #[command(flatten)]
        config: ConfigArgs,
    },
}

/// Adjuster settings shared by every subcommand. Flags override the file.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// TOML file with adjuster options.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    target: Option<f64>,
    #[arg(long)]
    scale_up: Option<f64>,
    #[arg(long)]
    scale_down: Option<f64>,
    #[arg(long)]
    scale_max: Option<f64>,
    #[arg(long)]
    scale_min: Option<f64>,
    /// Let zero, negative and non-finite measurements through instead of
    /// rejecting them.
    #[arg(long)]
    propagate: bool,
}

impl ConfigArgs {
    /// File options (if any) with command-line flags layered on top.
    pub fn options(&self) -> anyhow::Result<AdjusterOptions> {
        let file = match &self.config {
            Some(path) => AdjusterOptions::from_file(path)?,
            None => AdjusterOptions::default(),
        };
        let flags = AdjusterOptions {
            target: self.target,
            scale_up: self.scale_up,
            scale_down: self.scale_down,
            scale_max: self.scale_max,
            scale_min: self.scale_min,
            policy: self.propagate.then_some(MeasurementPolicy::Propagate),
        };
        Ok(file.merge(flags))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,adjust=debug"))?,
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compute {
            measurement,
            format,
            config,
        } => commands::compute::compute(&config.options()?, measurement, &format),
        Commands::Watch {
            interval_ms,
            initial_limit,
            max_limit,
            config,
        } => {
            commands::watch::watch(
                &config.options()?,
                Duration::from_millis(interval_ms),
                initial_limit,
                max_limit,
            )
            .await
        }
        Commands::Simulate {
            steps,
            seed,
            interval_ms,
            config,
        } => {
            commands::simulate::simulate(
                config.options()?,
                steps,
                seed,
                Duration::from_millis(interval_ms),
            )
            .await
        }
    }
}
