//! slcpi CLI entry point.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cli;

/// slcpi - VM provisioning for SoftLayer-style virtual guests
#[derive(Parser, Debug)]
#[command(name = "slcpi")]
#[command(about = "Provision virtual guests and manage their agent environment")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rewrite connection endpoints
    #[command(subcommand)]
    Endpoint(cli::endpoint::EndpointCmd),

    /// Read or edit a guest's agent environment
    #[command(subcommand)]
    AgentEnv(cli::agent_env::AgentEnvCmd),

    /// Inspect CPI configuration
    #[command(subcommand)]
    Config(cli::config::ConfigCmd),
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging based on RUST_LOG or default to warn
    init_logging();

    tracing::debug!(version = slcpi::VERSION, "starting slcpi");

    let result = match cli.command {
        Commands::Endpoint(cmd) => cmd.run(),
        Commands::AgentEnv(cmd) => cmd.run(),
        Commands::Config(cmd) => cmd.run(),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber.
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("slcpi=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
