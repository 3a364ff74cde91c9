use super::{AgentEnvService, AgentEnvServiceKind};
use crate::error::{Error, Result};
use crate::transfer::FileTransfer;
use slcpi_agent_env::{AgentEnv, SETTINGS_PATH};
use std::fmt;
use std::sync::Arc;

/// Settings document stored as a file on the guest.
pub struct FsAgentEnvService {
    transfer: Arc<dyn FileTransfer>,
    settings_path: String,
}

impl FsAgentEnvService {
    /// Service for the guest reachable through `transfer`, using the
    /// standard settings path.
    pub fn new(transfer: Arc<dyn FileTransfer>) -> Self {
        Self::with_path(transfer, SETTINGS_PATH)
    }

    /// Service storing the document at a non-standard path.
    pub fn with_path(transfer: Arc<dyn FileTransfer>, settings_path: impl Into<String>) -> Self {
        Self {
            transfer,
            settings_path: settings_path.into(),
        }
    }

    /// Guest path of the settings document.
    pub fn settings_path(&self) -> &str {
        &self.settings_path
    }
}

impl fmt::Debug for FsAgentEnvService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsAgentEnvService")
            .field("settings_path", &self.settings_path)
            .finish_non_exhaustive()
    }
}

impl AgentEnvService for FsAgentEnvService {
    fn fetch(&self) -> Result<AgentEnv> {
        let contents = self
            .transfer
            .download(&self.settings_path)
            .map_err(|cause| Error::Transfer {
                operation: "download",
                path: self.settings_path.clone(),
                cause,
            })?;

        let env = slcpi_agent_env::decode(&contents)?;
        tracing::debug!(path = %self.settings_path, agent_env = ?env, "fetched agent env");
        Ok(env)
    }

    fn update(&self, env: &AgentEnv) -> Result<()> {
        tracing::debug!(path = %self.settings_path, agent_env = ?env, "updating agent env");
        let contents = slcpi_agent_env::encode(env)?;

        self.transfer
            .upload(&self.settings_path, &contents)
            .map_err(|cause| Error::Transfer {
                operation: "upload",
                path: self.settings_path.clone(),
                cause,
            })
    }

    fn kind(&self) -> AgentEnvServiceKind {
        AgentEnvServiceKind::File
    }
}
