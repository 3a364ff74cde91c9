//! Inputs to VM creation as handed over by the director.

use crate::provider::{Datacenter, NetworkComponent, SshKey};
use serde::{Deserialize, Serialize};

pub use slcpi_agent_env::{EnvSpec as Environment, NetworksSpec as Networks};

/// Stemcell the guest boots from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stemcell {
    /// Stemcell id as known to the director.
    pub id: String,
    /// Global identifier of the provider image template.
    pub uuid: String,
}

/// Provider-specific sizing and placement of a new guest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VmCloudProperties {
    /// Prefix of the generated hostname.
    pub vm_name_prefix: String,
    /// Domain of the guest.
    pub domain: String,
    /// vCPU count.
    pub start_cpus: u32,
    /// Memory in MiB.
    pub max_memory: u32,
    /// Placement.
    pub datacenter: Datacenter,
    /// SSH keys to install.
    pub ssh_keys: Vec<SshKey>,
    /// Bill hourly instead of monthly.
    pub hourly_billing_flag: bool,
    /// Use local rather than SAN disks.
    pub local_disk_flag: bool,
    /// Place on a host dedicated to this account.
    pub dedicated_account_host_only_flag: bool,
    /// Attach only to the private network.
    pub private_network_only_flag: bool,
    /// Interface sizing.
    pub network_components: Vec<NetworkComponent>,
    /// Ephemeral disk size in GB. `0` requests none.
    pub ephemeral_disk_size: u32,
    /// Director address override.
    ///
    /// When unset, the director is assumed to run on this host and reaches the
    /// guest through a hosts-file record.
    #[serde(rename = "bosh_ip", alias = "boshIp", skip_serializing_if = "Option::is_none")]
    pub bosh_ip: Option<String>,
}

impl VmCloudProperties {
    /// Director override address, ignoring an empty value.
    pub fn director_ip(&self) -> Option<&str> {
        self.bosh_ip
            .as_deref()
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    }
}
