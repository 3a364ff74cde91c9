use super::{AgentEnvService, AgentEnvServiceKind};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use slcpi_agent_env::AgentEnv;
use std::fmt;
use std::sync::Arc;

/// Connection settings of the settings registry.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryOptions {
    /// Registry host.
    pub host: String,
    /// Registry port.
    pub port: u16,
    /// Basic-auth user.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
}

impl RegistryOptions {
    /// Base URL of the registry, without credentials.
    pub fn endpoint(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("http://[{}]:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    /// URL of one instance's settings.
    pub fn settings_url(&self, instance_id: u64) -> String {
        format!("{}/instances/{}/settings", self.endpoint(), instance_id)
    }
}

impl fmt::Debug for RegistryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Byte-level access to the settings registry.
///
/// Implementations own the HTTP exchange and report failures as
/// [`Error::Registry`](crate::Error::Registry).
pub trait RegistryClient: Send + Sync {
    /// Settings document of `instance_id`, as stored.
    fn fetch_settings(&self, options: &RegistryOptions, instance_id: u64) -> Result<Vec<u8>>;

    /// Replace the settings document of `instance_id`.
    fn update_settings(
        &self,
        options: &RegistryOptions,
        instance_id: u64,
        settings: &[u8],
    ) -> Result<()>;
}

/// Settings document stored in the registry under the guest's id.
pub struct RegistryAgentEnvService {
    client: Arc<dyn RegistryClient>,
    options: RegistryOptions,
    instance_id: u64,
}

impl RegistryAgentEnvService {
    /// Service for guest `instance_id`.
    pub fn new(client: Arc<dyn RegistryClient>, options: RegistryOptions, instance_id: u64) -> Self {
        Self {
            client,
            options,
            instance_id,
        }
    }

    /// Guest the service is bound to.
    pub fn instance_id(&self) -> u64 {
        self.instance_id
    }
}

impl fmt::Debug for RegistryAgentEnvService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryAgentEnvService")
            .field("options", &self.options)
            .field("instance_id", &self.instance_id)
            .finish_non_exhaustive()
    }
}

impl AgentEnvService for RegistryAgentEnvService {
    fn fetch(&self) -> Result<AgentEnv> {
        let contents = self.client.fetch_settings(&self.options, self.instance_id)?;
        let env = slcpi_agent_env::decode(&contents)?;
        tracing::debug!(
            instance_id = self.instance_id,
            registry = %self.options.endpoint(),
            agent_env = ?env,
            "fetched agent env"
        );
        Ok(env)
    }

    fn update(&self, env: &AgentEnv) -> Result<()> {
        tracing::debug!(
            instance_id = self.instance_id,
            registry = %self.options.endpoint(),
            agent_env = ?env,
            "updating agent env"
        );
        let contents = slcpi_agent_env::encode(env)?;
        self.client
            .update_settings(&self.options, self.instance_id, &contents)
    }

    fn kind(&self) -> AgentEnvServiceKind {
        AgentEnvServiceKind::Registry
    }
}
