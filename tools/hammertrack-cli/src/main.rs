//! HammerTrack CLI: analyse hammer-throw trajectories.
//!
//! Usage:
//!   hammertrack analyze <FILE>     Analyse a captured trajectory (CSV or JSONL)
//!   hammertrack compare <A> <B>    Compare two captured throws
//!   hammertrack replay <SESSION>   Replay a recorded live session
//!   hammertrack validate <FILE>    Check a trajectory or session file
//!   hammertrack config             Show (or write) the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use hammertrack_common::config::{AppConfig, LoggingConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "hammertrack",
    about = "Revolution and tilt analysis for hammer-throw trajectories",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/hammertrack/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a captured trajectory
    Analyze {
        /// Detection file (CSV `Frame,X,Y[,Confidence[,Timestamp]]` or JSONL)
        path: PathBuf,

        /// Gaussian smoothing sigma (samples)
        #[arg(long)]
        sigma: Option<f64>,

        /// Run turning-point detection on the raw positions
        #[arg(long)]
        no_smoothing: bool,

        /// Minimum trajectory length for analysis
        #[arg(long)]
        min_points: Option<usize>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare two captured throws
    Compare {
        /// First detection file
        first: PathBuf,

        /// Second detection file
        second: PathBuf,

        /// Print the comparison as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay a recorded live session through the acquisition controller
    Replay {
        /// Session file (JSONL)
        path: PathBuf,

        /// Hand every N-th frame to the detectors
        #[arg(long)]
        throttle: Option<u64>,

        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Check a trajectory or session file
    Validate {
        /// Path to the file
        path: PathBuf,
    },

    /// Show the effective configuration
    Config {
        /// Write it to the standard config location
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };

    let logging = if cli.verbose {
        LoggingConfig {
            level: "debug".to_string(),
            ..config.logging.clone()
        }
    } else {
        config.logging.clone()
    };
    hammertrack_common::logging::init_logging(&logging);

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    match cli.command {
        Commands::Analyze {
            path,
            sigma,
            no_smoothing,
            min_points,
            json,
        } => commands::analyze::run(path, &config, sigma, no_smoothing, min_points, json),
        Commands::Compare {
            first,
            second,
            json,
        } => commands::compare::run(first, second, &config, json),
        Commands::Replay {
            path,
            throttle,
            json,
        } => commands::replay::run(path, &config, throttle, json).await,
        Commands::Validate { path } => commands::validate::run(path, &config),
        Commands::Config { write } => commands::config::run(&config, write),
    }
}
