//! Agent environment delivery.
//!
//! An [`AgentEnvService`] reads and writes the settings document of one
//! guest. Two backends exist:
//!
//! - [`FsAgentEnvService`]: the document is a JSON file on the guest,
//!   moved through a [`FileTransfer`](crate::transfer::FileTransfer).
//! - [`RegistryAgentEnvService`]: the document lives in a settings registry
//!   keyed by instance id.
//!
//! Neither backend caches. Every `fetch` and `update` round-trips to storage,
//! and concurrent updates to the same guest are last-write-wins.

mod factory;
mod fs;
mod registry;

pub use factory::{AgentEnvServiceFactory, AgentEnvServiceKind};
pub use fs::FsAgentEnvService;
pub use registry::{RegistryAgentEnvService, RegistryClient, RegistryOptions};
pub use slcpi_agent_env::{AgentEnv, SETTINGS_PATH};

use crate::error::Result;

/// Persistence of one guest's agent environment.
pub trait AgentEnvService: Send + Sync {
    /// Read the current document.
    fn fetch(&self) -> Result<AgentEnv>;

    /// Replace the stored document.
    fn update(&self, env: &AgentEnv) -> Result<()>;

    /// Which backend this is.
    fn kind(&self) -> AgentEnvServiceKind;
}
