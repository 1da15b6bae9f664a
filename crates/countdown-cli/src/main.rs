use std::path::PathBuf;

use clap::{Parser, Subcommand};
use countdown_core::{Config, CoreError};
use tracing_subscriber::EnvFilter;

mod commands;
mod host;

#[derive(Parser)]
#[command(name = "countdown", version, about = "Countdown clock")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive clock in this terminal
    Run(commands::run::RunArgs),
    /// Run one countdown headlessly and print its events as JSON lines
    Simulate(commands::simulate::SimulateArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("countdown_cli={level},countdown_core={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn dispatch(cli: Cli) -> Result<(), CoreError> {
    let path = match cli.config {
        Some(path) => path,
        None => Config::path()?,
    };

    let loaded = Config::load_from(&path);
    let level = loaded
        .as_ref()
        .map(|c| c.log.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_tracing(&level);

    match cli.command {
        Commands::Config { action } => commands::config::run(action, &path),
        Commands::Run(args) => commands::run::run(args, &loaded?),
        Commands::Simulate(args) => commands::simulate::run(args, &loaded?),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = dispatch(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
