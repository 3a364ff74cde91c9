//! Configuration commands.

use clap::{Args, Subcommand};
use slcpi::CpiConfig;
use std::path::PathBuf;

/// Inspect CPI configuration
#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Load and validate the configuration file
    Check(ConfigCheckCmd),
}

impl ConfigCmd {
    pub fn run(self) -> slcpi::Result<()> {
        match self {
            ConfigCmd::Check(cmd) => cmd.run(),
        }
    }
}

/// Load the configuration, validate it, and print the effective settings.
///
/// Examples:
///   slcpi config check
///   slcpi config check --config ./cpi.toml
#[derive(Args, Debug)]
pub struct ConfigCheckCmd {
    /// Config file (default: ~/.config/slcpi/cpi.toml)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ConfigCheckCmd {
    pub fn run(self) -> slcpi::Result<()> {
        let config = match &self.config {
            Some(path) => CpiConfig::load_from(path)?,
            None => CpiConfig::load()?,
        };
        config.validate()?;

        println!("agent env service: {}", config.agent_env_service_kind());
        println!("hosts file:        {}", config.hosts_file.display());
        println!(
            "provision timeout: {}",
            humantime::format_duration(config.provisioning.timeout)
        );
        println!(
            "poll interval:     {}",
            humantime::format_duration(config.provisioning.poll_interval)
        );
        println!("mbus:              {}", config.agent.mbus);
        println!("blobstore:         {}", config.agent.blobstore.provider());
        Ok(())
    }
}
