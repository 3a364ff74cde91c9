use super::{AgentEnvService, FsAgentEnvService, RegistryAgentEnvService, RegistryClient, RegistryOptions};
use crate::transfer::FileTransfer;
use std::fmt;
use std::sync::Arc;

/// Agent environment backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AgentEnvServiceKind {
    /// Settings file on the guest.
    #[default]
    File,
    /// Settings registry.
    Registry,
}

impl AgentEnvServiceKind {
    /// Discriminator selecting the registry backend.
    pub const REGISTRY: &'static str = "registry";

    /// Discriminator selecting the file backend.
    pub const FILE: &'static str = "file";

    /// Map a configuration value to a backend.
    ///
    /// Only `"registry"` selects the registry. Every other value, including
    /// an empty or unknown one, selects the file backend. That fallback is the
    /// documented default, not an inference about what the caller meant.
    pub fn from_discriminator(value: &str) -> Self {
        if value == Self::REGISTRY {
            AgentEnvServiceKind::Registry
        } else {
            AgentEnvServiceKind::File
        }
    }

    /// Configuration value naming this backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentEnvServiceKind::File => Self::FILE,
            AgentEnvServiceKind::Registry => Self::REGISTRY,
        }
    }
}

impl fmt::Display for AgentEnvServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the agent environment service for each new guest.
pub struct AgentEnvServiceFactory {
    kind: AgentEnvServiceKind,
    registry_options: RegistryOptions,
    registry_client: Arc<dyn RegistryClient>,
}

impl AgentEnvServiceFactory {
    /// Factory selecting its backend from `discriminator`.
    ///
    /// The registry settings are only used when the registry backend is
    /// selected.
    pub fn new(
        discriminator: &str,
        registry_options: RegistryOptions,
        registry_client: Arc<dyn RegistryClient>,
    ) -> Self {
        let kind = AgentEnvServiceKind::from_discriminator(discriminator);
        if !discriminator.is_empty() && discriminator != kind.as_str() {
            tracing::warn!(
                discriminator,
                fallback = %kind,
                "unrecognized agent env service, using file backend"
            );
        }

        Self {
            kind,
            registry_options,
            registry_client,
        }
    }

    /// Backend this factory produces.
    pub fn kind(&self) -> AgentEnvServiceKind {
        self.kind
    }

    /// Service bound to guest `instance_id`, reachable through `transfer`.
    pub fn new_service(
        &self,
        transfer: Arc<dyn FileTransfer>,
        instance_id: u64,
    ) -> Box<dyn AgentEnvService> {
        match self.kind {
            AgentEnvServiceKind::Registry => Box::new(RegistryAgentEnvService::new(
                Arc::clone(&self.registry_client),
                self.registry_options.clone(),
                instance_id,
            )),
            AgentEnvServiceKind::File => Box::new(FsAgentEnvService::new(transfer)),
        }
    }
}

impl fmt::Debug for AgentEnvServiceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentEnvServiceFactory")
            .field("kind", &self.kind)
            .field("registry_options", &self.registry_options)
            .finish_non_exhaustive()
    }
}
