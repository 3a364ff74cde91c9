//! VM creation workflow.

use super::user_data::build_agent_env;
use super::{Environment, Networks, Stemcell, Vm, VmCloudProperties};
use crate::agent_env::AgentEnvServiceFactory;
use crate::config::{AgentOptions, ProvisionConfig};
use crate::endpoint::rewrite_host;
use crate::error::{Error, Result};
use crate::hosts::HostsFile;
use crate::provider::{
    wait_for_last_complete_transaction, CancelToken, ProviderClient, VirtualGuest,
    VirtualGuestTemplate, SERVICE_SETUP_TRANSACTION,
};
use crate::transfer::FileTransfer;
use slcpi_agent_env::BlobstoreConfig;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// Opens a file-transfer channel to a guest.
///
/// Called once per creation, after the guest's details (addresses) are known.
pub trait TransferConnector: Send + Sync {
    /// Channel to `guest`'s filesystem.
    fn connect(&self, guest: &VirtualGuest) -> Result<Arc<dyn FileTransfer>>;
}

impl<F> TransferConnector for F
where
    F: Fn(&VirtualGuest) -> Result<Arc<dyn FileTransfer>> + Send + Sync,
{
    fn connect(&self, guest: &VirtualGuest) -> Result<Arc<dyn FileTransfer>> {
        self(guest)
    }
}

/// Step of [`VmCreator::create`] most recently completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateStage {
    /// Creation request built.
    TemplateBuilt,
    /// Provider accepted the request and assigned an id.
    Created,
    /// Setup transaction finished, or ephemeral disk attached.
    PostCreateResolved,
    /// Addresses and FQDN known.
    DetailsFetched,
    /// Settings document assembled.
    EnvironmentComposed,
    /// Settings document stored.
    EnvironmentDelivered,
    /// Handle returned.
    Ready,
}

impl fmt::Display for CreateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CreateStage::TemplateBuilt => "template-built",
            CreateStage::Created => "created",
            CreateStage::PostCreateResolved => "post-create-resolved",
            CreateStage::DetailsFetched => "details-fetched",
            CreateStage::EnvironmentComposed => "environment-composed",
            CreateStage::EnvironmentDelivered => "environment-delivered",
            CreateStage::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Creates guests and hands them their agent environment.
///
/// A failure after the provider has created the guest aborts creation but
/// leaves the guest running; the error carries its id (see
/// [`Error::instance_id`]) so the caller can dispose of it.
pub struct VmCreator {
    provider: Arc<dyn ProviderClient>,
    factory: AgentEnvServiceFactory,
    connector: Box<dyn TransferConnector>,
    agent_options: AgentOptions,
    hosts: HostsFile,
    provisioning: ProvisionConfig,
    cancel: CancelToken,
}

impl VmCreator {
    /// Creator with default hosts file, wait timing, and no cancellation.
    pub fn new(
        provider: Arc<dyn ProviderClient>,
        factory: AgentEnvServiceFactory,
        connector: impl TransferConnector + 'static,
        agent_options: AgentOptions,
    ) -> Self {
        Self {
            provider,
            factory,
            connector: Box::new(connector),
            agent_options,
            hosts: HostsFile::default(),
            provisioning: ProvisionConfig::default(),
            cancel: CancelToken::new(),
        }
    }

    /// Use `hosts` for guest records.
    pub fn with_hosts_file(mut self, hosts: HostsFile) -> Self {
        self.hosts = hosts;
        self
    }

    /// Use `provisioning` for the setup-transaction wait.
    pub fn with_provision_config(mut self, provisioning: ProvisionConfig) -> Self {
        self.provisioning = provisioning;
        self
    }

    /// Abort pending waits when `cancel` fires.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Create a guest and deliver its agent environment.
    ///
    /// Wait timing is validated first, so a bad [`ProvisionConfig`] fails
    /// before any guest exists.
    pub fn create(
        &self,
        agent_id: &str,
        stemcell: &Stemcell,
        props: &VmCloudProperties,
        networks: Networks,
        env: Environment,
    ) -> Result<Vm> {
        self.provisioning.validate()?;
        let template = VirtualGuestTemplate::build(stemcell, props, SystemTime::now())?;
        tracing::debug!(
            stage = %CreateStage::TemplateBuilt,
            hostname = %template.hostname,
            datacenter = %template.datacenter.name,
            "built virtual guest template"
        );

        let guest = self
            .provider
            .create_object(&template)
            .map_err(|e| Error::ProviderCreate { cause: Box::new(e) })?;
        let instance_id = guest.id;
        tracing::info!(stage = %CreateStage::Created, instance_id, "virtual guest created");

        let mut stage = CreateStage::Created;
        let result = self.provision(instance_id, &mut stage, agent_id, props, networks, env);
        if let Err(e) = &result {
            tracing::error!(
                instance_id,
                last_stage = %stage,
                error = %e,
                "vm creation aborted, virtual guest left in place"
            );
        }
        result
    }

    fn provision(
        &self,
        instance_id: u64,
        stage: &mut CreateStage,
        agent_id: &str,
        props: &VmCloudProperties,
        networks: Networks,
        env: Environment,
    ) -> Result<Vm> {
        if props.ephemeral_disk_size == 0 {
            wait_for_last_complete_transaction(
                self.provider.as_ref(),
                instance_id,
                SERVICE_SETUP_TRANSACTION,
                self.provisioning.timeout,
                self.provisioning.poll_interval,
                &self.cancel,
            )?;
        } else {
            self.provider
                .attach_ephemeral_disk(instance_id, props.ephemeral_disk_size)
                .map_err(|e| Error::DiskAttach {
                    instance_id,
                    cause: Box::new(e),
                })?;
            tracing::info!(instance_id, size_gb = props.ephemeral_disk_size, "ephemeral disk attached");
        }
        advance(stage, CreateStage::PostCreateResolved, instance_id);

        let guest = self
            .provider
            .get_object_details(instance_id)
            .map_err(|e| Error::DetailFetch {
                instance_id,
                cause: Box::new(e),
            })?;
        let private_ip = guest
            .private_ip()
            .ok_or_else(|| Error::DetailFetch {
                instance_id,
                cause: Box::new(Error::provider(
                    "get_object_details",
                    "no private address assigned",
                )),
            })?
            .to_string();
        advance(stage, CreateStage::DetailsFetched, instance_id);

        let transfer = self.connector.connect(&guest).map_err(|e| Error::Delivery {
            instance_id,
            cause: Box::new(e),
        })?;
        let service = self.factory.new_service(Arc::clone(&transfer), instance_id);

        let agent = self.agent_options_for(&guest, &private_ip, props)?;
        let agent_env = build_agent_env(agent_id, &guest, props, networks, env, agent);
        advance(stage, CreateStage::EnvironmentComposed, instance_id);

        service.update(&agent_env).map_err(|e| Error::Delivery {
            instance_id,
            cause: Box::new(e),
        })?;
        advance(stage, CreateStage::EnvironmentDelivered, instance_id);

        let vm = Vm::new(instance_id, Arc::clone(&self.provider), transfer, service);
        advance(stage, CreateStage::Ready, instance_id);
        Ok(vm)
    }

    /// Agent options with endpoints pointed at the director as seen from
    /// this guest.
    ///
    /// Without a director override, the director runs here: record the guest
    /// in the hosts file and point the bus at the guest's private address.
    /// With one, point the bus and a DAV blob store at the override. Other
    /// blob stores are left as configured.
    fn agent_options_for(
        &self,
        guest: &VirtualGuest,
        private_ip: &str,
        props: &VmCloudProperties,
    ) -> Result<AgentOptions> {
        let mut agent = self.agent_options.clone();

        match props.director_ip() {
            None => {
                self.hosts.append_record(private_ip, &guest.fqdn())?;
                agent.mbus = rewrite_host(&agent.mbus, private_ip)?;
            }
            Some(director_ip) => {
                agent.mbus = rewrite_host(&agent.mbus, director_ip)?;
                match &mut agent.blobstore {
                    BlobstoreConfig::Dav(dav) => {
                        dav.endpoint = rewrite_host(&dav.endpoint, director_ip)?;
                    }
                    other => {
                        tracing::debug!(
                            provider = other.provider(),
                            "blobstore has no endpoint to rewrite"
                        );
                    }
                }
            }
        }

        Ok(agent)
    }
}

fn advance(stage: &mut CreateStage, next: CreateStage, instance_id: u64) {
    *stage = next;
    tracing::info!(stage = %next, instance_id, "vm creation progressed");
}

impl fmt::Debug for VmCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VmCreator")
            .field("factory", &self.factory)
            .field("hosts", &self.hosts)
            .field("provisioning", &self.provisioning)
            .finish_non_exhaustive()
    }
}
