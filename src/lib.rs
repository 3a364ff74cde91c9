//! slcpi - VM provisioning for SoftLayer-style virtual guests
//!
//! slcpi creates virtual guests on a remote provider and delivers the
//! boot-time settings document (the "agent environment") that the management
//! agent inside the guest reads to configure its network, message bus, and
//! blob store.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │  slcpi CLI / Library                            │
//! ├─────────────────────────────────────────────────┤
//! │  VmCreator (template → create → wait/attach →   │
//! │             details → compose → deliver)        │
//! ├──────────────────────┬──────────────────────────┤
//! │  ProviderClient      │  AgentEnvService         │
//! │  (virtual guests,    │  (settings file via      │
//! │   transactions)      │   FileTransfer, or       │
//! │                      │   registry)              │
//! └──────────────────────┴──────────────────────────┘
//! ```
//!
//! The provider API, the file transfer channel, and the registry are reached
//! through the [`ProviderClient`], [`FileTransfer`], and [`RegistryClient`]
//! traits.
//!
//! # Example
//!
//! ```no_run
//! use slcpi::{AgentEnvServiceFactory, CpiConfig, HostsFile, VmCreator};
//! # fn provider() -> std::sync::Arc<dyn slcpi::ProviderClient> { unimplemented!() }
//! # fn registry() -> std::sync::Arc<dyn slcpi::RegistryClient> { unimplemented!() }
//! # fn connect(_: &slcpi::VirtualGuest) -> slcpi::Result<std::sync::Arc<dyn slcpi::FileTransfer>> { unimplemented!() }
//!
//! let config = CpiConfig::load().unwrap();
//! let factory = AgentEnvServiceFactory::new(
//!     &config.agent_env_service,
//!     config.registry.clone(),
//!     registry(),
//! );
//!
//! let creator = VmCreator::new(provider(), factory, connect, config.agent.clone())
//!     .with_hosts_file(HostsFile::new(&config.hosts_file))
//!     .with_provision_config(config.provisioning);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod agent_env;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod hosts;
pub mod provider;
pub mod transfer;
pub mod vm;

// Re-export main types for convenience
pub use agent_env::{
    AgentEnvService, AgentEnvServiceFactory, AgentEnvServiceKind, FsAgentEnvService,
    RegistryAgentEnvService, RegistryClient, RegistryOptions,
};
pub use config::{AgentOptions, CpiConfig, ProvisionConfig};
pub use endpoint::rewrite_host;
pub use error::{Error, Result};
pub use hosts::HostsFile;
pub use provider::{CancelToken, ProviderClient, Transaction, VirtualGuest, VirtualGuestTemplate};
pub use transfer::{FileTransfer, LocalFileTransfer, MemoryFileTransfer};
pub use vm::{Stemcell, Vm, VmCloudProperties, VmCreator};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
