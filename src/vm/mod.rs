//! Virtual machines: creation inputs, the creation workflow, and the handle
//! returned for a created guest.

mod creator;
mod props;
mod user_data;

pub use creator::{CreateStage, TransferConnector, VmCreator};
pub use props::{Environment, Networks, Stemcell, VmCloudProperties};
pub use user_data::build_agent_env;

use crate::agent_env::{AgentEnv, AgentEnvService};
use crate::error::{Error, Result};
use crate::provider::{ProviderClient, VirtualGuest};
use crate::transfer::FileTransfer;
use std::fmt;
use std::sync::Arc;

/// A created guest.
///
/// Owns the agent environment service bound to the guest. Document access is
/// not synchronized: callers that mutate the same guest's document from more
/// than one thread must serialize those calls themselves.
pub struct Vm {
    id: u64,
    provider: Arc<dyn ProviderClient>,
    transfer: Arc<dyn FileTransfer>,
    agent_env: Box<dyn AgentEnvService>,
}

impl Vm {
    /// Handle for guest `id`.
    pub fn new(
        id: u64,
        provider: Arc<dyn ProviderClient>,
        transfer: Arc<dyn FileTransfer>,
        agent_env: Box<dyn AgentEnvService>,
    ) -> Self {
        Self {
            id,
            provider,
            transfer,
            agent_env,
        }
    }

    /// Provider-assigned id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// File transfer channel to the guest.
    pub fn transfer(&self) -> &Arc<dyn FileTransfer> {
        &self.transfer
    }

    /// Service holding the guest's settings document.
    pub fn agent_env_service(&self) -> &dyn AgentEnvService {
        self.agent_env.as_ref()
    }

    /// Current provider view of the guest.
    pub fn details(&self) -> Result<VirtualGuest> {
        self.provider
            .get_object_details(self.id)
            .map_err(|e| Error::DetailFetch {
                instance_id: self.id,
                cause: Box::new(e),
            })
    }

    /// Read the guest's settings document.
    pub fn fetch_agent_env(&self) -> Result<AgentEnv> {
        self.agent_env.fetch()
    }

    /// Read, modify, and write back the settings document.
    ///
    /// Returns the document as written.
    pub fn update_agent_env<F>(&self, f: F) -> Result<AgentEnv>
    where
        F: FnOnce(&mut AgentEnv),
    {
        let mut env = self.agent_env.fetch()?;
        f(&mut env);
        self.agent_env.update(&env)?;
        Ok(env)
    }

    /// Tell the agent to mount persistent disk `disk_id` from `device`.
    pub fn attach_persistent_disk(&self, disk_id: &str, device: &str) -> Result<()> {
        self.update_agent_env(|env| env.attach_persistent_disk(disk_id, device))?;
        tracing::info!(instance_id = self.id, disk_id, device, "persistent disk recorded");
        Ok(())
    }

    /// Remove persistent disk `disk_id` from the agent's settings.
    ///
    /// Detaching a disk that was never recorded is not an error.
    pub fn detach_persistent_disk(&self, disk_id: &str) -> Result<()> {
        let mut removed = None;
        self.update_agent_env(|env| removed = env.detach_persistent_disk(disk_id))?;
        if removed.is_none() {
            tracing::debug!(instance_id = self.id, disk_id, "persistent disk was not recorded");
        }
        Ok(())
    }
}

impl fmt::Debug for Vm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vm")
            .field("id", &self.id)
            .field("agent_env", &self.agent_env.kind())
            .finish_non_exhaustive()
    }
}
