// supctl - Control remote supervisord instances

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use supctl_cli::commands;
use supctl_cli::config_discovery;
use supctl_cli::console::Console;
use supctl_common::SupctlConfig;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "supctl")]
#[command(about = "Control processes on remote supervisord instances", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the supervisor configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stop supervisor processes
    #[command(name = "process:stop")]
    ProcessStop(commands::ProcessStopArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config_path = config_discovery::discover_config(cli.config)?;
    info!("Using configuration: {:?}", config_path);

    let config = SupctlConfig::from_file(&config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;
    let supervisors = supctl_cli::connect_supervisors(&config)?;
    info!("Loaded {} supervisor(s)", supervisors.len());

    let mut console = Console::stdout();
    let report = match cli.command {
        Commands::ProcessStop(args) => {
            commands::process_stop(&args, &supervisors, &mut console).await?
        }
    };

    std::process::exit(report.exit_code());
}
