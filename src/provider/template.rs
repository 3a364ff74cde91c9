//! Virtual guest creation request.

use crate::error::{Error, Result};
use crate::vm::{Stemcell, VmCloudProperties};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Datacenter reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datacenter {
    /// Datacenter short name, e.g. `dal10`.
    pub name: String,
}

/// Image the guest boots from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDeviceTemplateGroup {
    /// Image template global identifier (the stemcell uuid).
    pub global_identifier: String,
}

/// SSH key registered with the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshKey {
    /// Provider key id.
    pub id: u64,
}

/// Network interface sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkComponent {
    /// Port speed in Mbps.
    pub max_speed: u32,
}

/// Request body for the provider's `createObject` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualGuestTemplate {
    /// Hostname of the new guest.
    pub hostname: String,
    /// Domain of the new guest.
    pub domain: String,
    /// vCPU count.
    pub start_cpus: u32,
    /// Memory in MiB.
    pub max_memory: u32,
    /// Placement.
    pub datacenter: Datacenter,
    /// Boot image.
    pub block_device_template_group: BlockDeviceTemplateGroup,
    /// SSH keys to install.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
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
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub network_components: Vec<NetworkComponent>,
}

impl VirtualGuestTemplate {
    /// Translate a stemcell and cloud properties into a creation request.
    ///
    /// `now` provides the hostname suffix, so each call yields a distinct
    /// hostname for the same prefix.
    pub fn build(stemcell: &Stemcell, props: &VmCloudProperties, now: SystemTime) -> Result<Self> {
        if stemcell.uuid.trim().is_empty() {
            return Err(Error::template_build(format!(
                "stemcell {} has no image uuid",
                stemcell.id
            )));
        }
        if props.vm_name_prefix.trim().is_empty() {
            return Err(Error::template_build("vmNamePrefix is required"));
        }
        if props.domain.trim().is_empty() {
            return Err(Error::template_build("domain is required"));
        }
        if props.datacenter.name.trim().is_empty() {
            return Err(Error::template_build("datacenter name is required"));
        }
        if props.start_cpus == 0 {
            return Err(Error::template_build("startCpus must be greater than 0"));
        }
        if props.max_memory == 0 {
            return Err(Error::template_build("maxMemory must be greater than 0"));
        }

        let suffix = now
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();

        Ok(Self {
            hostname: format!("{}{}", props.vm_name_prefix, suffix),
            domain: props.domain.clone(),
            start_cpus: props.start_cpus,
            max_memory: props.max_memory,
            datacenter: props.datacenter.clone(),
            block_device_template_group: BlockDeviceTemplateGroup {
                global_identifier: stemcell.uuid.clone(),
            },
            ssh_keys: props.ssh_keys.clone(),
            hourly_billing_flag: props.hourly_billing_flag,
            local_disk_flag: props.local_disk_flag,
            dedicated_account_host_only_flag: props.dedicated_account_host_only_flag,
            private_network_only_flag: props.private_network_only_flag,
            network_components: props.network_components.clone(),
        })
    }
}
