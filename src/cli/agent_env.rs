//! Agent environment commands.
//!
//! These operate on a guest filesystem exposed as a local directory, such as
//! a mounted guest disk or an image staging tree.

use clap::{Args, Subcommand};
use slcpi::agent_env::{AgentEnvService, FsAgentEnvService, SETTINGS_PATH};
use slcpi::LocalFileTransfer;
use std::path::PathBuf;
use std::sync::Arc;

/// Read or edit a guest's agent environment
#[derive(Subcommand, Debug)]
pub enum AgentEnvCmd {
    /// Print the settings document
    Show(AgentEnvShowCmd),

    /// Point the message bus URL at a new host
    SetMbus(AgentEnvSetMbusCmd),
}

impl AgentEnvCmd {
    pub fn run(self) -> slcpi::Result<()> {
        match self {
            AgentEnvCmd::Show(cmd) => cmd.run(),
            AgentEnvCmd::SetMbus(cmd) => cmd.run(),
        }
    }
}

/// Guest filesystem location shared by the agent-env commands.
#[derive(Args, Debug)]
pub struct GuestRootArgs {
    /// Directory standing in for the guest's `/`
    #[arg(long, value_name = "DIR")]
    pub root: PathBuf,

    /// Settings document path on the guest
    #[arg(long, value_name = "PATH", default_value = SETTINGS_PATH)]
    pub settings_path: String,
}

impl GuestRootArgs {
    fn service(&self) -> FsAgentEnvService {
        let transfer = Arc::new(LocalFileTransfer::new(&self.root));
        FsAgentEnvService::with_path(transfer, self.settings_path.clone())
    }
}

/// Print the agent environment as pretty JSON.
///
/// Examples:
///   slcpi agent-env show --root /mnt/guest
#[derive(Args, Debug)]
pub struct AgentEnvShowCmd {
    #[command(flatten)]
    pub guest: GuestRootArgs,
}

impl AgentEnvShowCmd {
    pub fn run(self) -> slcpi::Result<()> {
        let env = self.guest.service().fetch()?;
        let rendered = serde_json::to_string_pretty(&env)
            .map_err(slcpi_agent_env::EncodeError::from)?;
        println!("{}", rendered);
        Ok(())
    }
}

/// Rewrite the host of the message bus URL in place.
///
/// Examples:
///   slcpi agent-env set-mbus --root /mnt/guest 10.0.0.5
#[derive(Args, Debug)]
pub struct AgentEnvSetMbusCmd {
    #[command(flatten)]
    pub guest: GuestRootArgs,

    /// New message bus host or IP address
    #[arg(value_name = "HOST")]
    pub host: String,
}

impl AgentEnvSetMbusCmd {
    pub fn run(self) -> slcpi::Result<()> {
        let service = self.guest.service();
        let mut env = service.fetch()?;
        env.mbus = slcpi::rewrite_host(&env.mbus, &self.host)?;
        service.update(&env)?;

        tracing::info!(root = %self.guest.root.display(), mbus = %env.mbus, "updated mbus");
        println!("{}", env.mbus);
        Ok(())
    }
}
