//! server-launch
//!
//! Resolves the launch configuration handed to the application server and
//! lets operators check or inspect it before a deploy.
//!
//! # Resolution Order
//!
//! ```text
//!   host defaults (2 × CPUs + 1, capped at 4 workers)
//!        │
//!        ▼
//!   --config FILE (TOML, optional)
//!        │
//!        ▼
//!   WEB_CONCURRENCY / PORT
//!        │
//!        ▼
//!   validation ──▶ LaunchConfig
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use server_launch::config::load_config;
use server_launch::observability::init_logging;
use server_launch::workers::RecyclePolicy;
use server_launch::{LaunchConfig, WorkerTopology};

#[derive(Parser)]
#[command(name = "server-launch")]
#[command(about = "Resolve and inspect the application server launch configuration", long_about = None)]
struct Cli {
    /// TOML file layered over the built-in defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and validate the configuration
    Check,
    /// Print the resolved configuration
    Dump {
        #[arg(short, long, value_enum, default_value_t = DumpFormat::Toml)]
        format: DumpFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DumpFormat {
    Toml,
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).map_err(|e| e.to_string())?;

    match cli.command {
        Commands::Check => check(&config)?,
        Commands::Dump { format } => dump(&config, format)?,
    }

    Ok(())
}

fn check(config: &LaunchConfig) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&config.logging)?;

    let topology = WorkerTopology::from_config(config);
    let recycling = RecyclePolicy::new(&config.recycling);

    tracing::info!(
        bind = %config.server.bind,
        worker_class = %topology.worker_class,
        workers = topology.workers,
        threads = topology.threads,
        capacity = topology.capacity(),
        timeout_secs = config.timeouts.timeout,
        recycling = recycling.is_enabled(),
        "Configuration valid"
    );

    println!("{}", topology.summary());
    Ok(())
}

fn dump(config: &LaunchConfig, format: DumpFormat) -> Result<(), Box<dyn std::error::Error>> {
    let rendered = match format {
        DumpFormat::Toml => toml::to_string_pretty(config)?,
        DumpFormat::Json => serde_json::to_string_pretty(config)?,
    };
    println!("{}", rendered);
    Ok(())
}
