//! Remote provider client interface.
//!
//! The provider's API (SoftLayer's `SoftLayer_Virtual_Guest` service) is an
//! external collaborator. This module defines the narrow surface the
//! provisioner needs, plus the request and response shapes it reads.

mod template;
mod wait;

pub use template::{
    BlockDeviceTemplateGroup, Datacenter, NetworkComponent, SshKey, VirtualGuestTemplate,
};
pub use wait::{wait_for_last_complete_transaction, CancelToken, SERVICE_SETUP_TRANSACTION};

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Transaction status the provider reports once a transaction has finished.
pub const TRANSACTION_STATUS_COMPLETE: &str = "COMPLETE";

/// Operations on the provider's virtual guest service.
///
/// Implementations wrap the provider's HTTP API. Any internal retrying they do
/// is invisible to the provisioner, which never retries these calls itself.
pub trait ProviderClient: Send + Sync {
    /// Submit a creation request, returning the new guest.
    ///
    /// The returned guest carries at least its id; addresses are usually not
    /// assigned yet.
    fn create_object(&self, template: &VirtualGuestTemplate) -> Result<VirtualGuest>;

    /// Fetch full details of a guest, including assigned addresses.
    fn get_object_details(&self, id: u64) -> Result<VirtualGuest>;

    /// Order and attach an ephemeral disk of `size_gb` to a guest.
    fn attach_ephemeral_disk(&self, id: u64, size_gb: u32) -> Result<()>;

    /// The guest's most recent transaction, if any.
    fn get_last_transaction(&self, id: u64) -> Result<Option<Transaction>>;
}

/// A virtual guest as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualGuest {
    /// Provider-assigned id.
    pub id: u64,
    /// Short hostname.
    #[serde(default)]
    pub hostname: String,
    /// Domain.
    #[serde(default)]
    pub domain: String,
    /// `hostname.domain`.
    #[serde(default)]
    pub fully_qualified_domain_name: String,
    /// Address on the private (backend) network.
    #[serde(default)]
    pub primary_backend_ip_address: Option<String>,
    /// Address on the public network, if the guest has one.
    #[serde(default)]
    pub primary_ip_address: Option<String>,
}

impl VirtualGuest {
    /// Private address, once assigned.
    pub fn private_ip(&self) -> Option<&str> {
        self.primary_backend_ip_address
            .as_deref()
            .filter(|ip| !ip.is_empty())
    }

    /// Fully qualified name, built from hostname and domain if the provider
    /// did not report one.
    pub fn fqdn(&self) -> String {
        if !self.fully_qualified_domain_name.is_empty() {
            self.fully_qualified_domain_name.clone()
        } else if self.domain.is_empty() {
            self.hostname.clone()
        } else {
            format!("{}.{}", self.hostname, self.domain)
        }
    }
}

/// An asynchronous unit of work tracked by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Transaction id.
    pub id: u64,
    /// Transaction group name, e.g. `Service Setup`.
    #[serde(default)]
    pub group: Option<String>,
    /// Status name, e.g. `COMPLETE`.
    pub status: String,
}

impl Transaction {
    /// Whether this is a finished transaction of `group`.
    pub fn is_complete(&self, group: &str) -> bool {
        self.group.as_deref() == Some(group) && self.status == TRANSACTION_STATUS_COMPLETE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_is_complete() {
        let tx = Transaction {
            id: 1,
            group: Some(SERVICE_SETUP_TRANSACTION.to_string()),
            status: TRANSACTION_STATUS_COMPLETE.to_string(),
        };
        assert!(tx.is_complete(SERVICE_SETUP_TRANSACTION));
        assert!(!tx.is_complete("Cloud Migrate"));

        let pending = Transaction {
            status: "PENDING".to_string(),
            ..tx
        };
        assert!(!pending.is_complete(SERVICE_SETUP_TRANSACTION));
    }

    #[test]
    fn test_fqdn_falls_back_to_hostname_and_domain() {
        let guest = VirtualGuest {
            id: 7,
            hostname: "bosh-0".to_string(),
            domain: "example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(guest.fqdn(), "bosh-0.example.com");

        let reported = VirtualGuest {
            fully_qualified_domain_name: "bosh-0.softlayer.com".to_string(),
            ..guest
        };
        assert_eq!(reported.fqdn(), "bosh-0.softlayer.com");
    }

    #[test]
    fn test_private_ip_ignores_empty() {
        let mut guest = VirtualGuest {
            primary_backend_ip_address: Some(String::new()),
            ..Default::default()
        };
        assert!(guest.private_ip().is_none());

        guest.primary_backend_ip_address = Some("10.0.0.5".to_string());
        assert_eq!(guest.private_ip(), Some("10.0.0.5"));
    }

    #[test]
    fn test_virtual_guest_from_provider_json() {
        let guest: VirtualGuest = serde_json::from_str(
            r#"{
                "id": 1234,
                "hostname": "bosh-0",
                "domain": "example.com",
                "fullyQualifiedDomainName": "bosh-0.example.com",
                "primaryBackendIpAddress": "10.0.0.5"
            }"#,
        )
        .unwrap();
        assert_eq!(guest.id, 1234);
        assert_eq!(guest.private_ip(), Some("10.0.0.5"));
        assert!(guest.primary_ip_address.is_none());
    }
}
