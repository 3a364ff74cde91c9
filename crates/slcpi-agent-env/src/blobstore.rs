//! Blob store configuration.
//!
//! On the wire a blob store is `{"provider": "<kind>", "options": {...}}` with
//! a provider-specific options object. Recognized providers decode into typed
//! variants; anything else is carried through verbatim as [`BlobstoreConfig::Other`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Provider name of the WebDAV blob store.
pub const PROVIDER_DAV: &str = "dav";

/// Provider name of the local-filesystem blob store.
pub const PROVIDER_LOCAL: &str = "local";

/// Default path of the local blob store on a guest.
pub const DEFAULT_LOCAL_BLOBSTORE_PATH: &str = "/var/vcap/micro_bosh/data/cache";

/// Blob store the agent should use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBlobstore", into = "RawBlobstore")]
pub enum BlobstoreConfig {
    /// WebDAV blob store reachable over the network.
    Dav(DavOptions),
    /// Blob store on the guest's own filesystem.
    Local(LocalOptions),
    /// Any other provider, passed through untouched.
    Other {
        /// Provider name as given.
        provider: String,
        /// Provider options as given.
        options: BTreeMap<String, Value>,
    },
}

impl BlobstoreConfig {
    /// Provider name as written on the wire.
    pub fn provider(&self) -> &str {
        match self {
            BlobstoreConfig::Dav(_) => PROVIDER_DAV,
            BlobstoreConfig::Local(_) => PROVIDER_LOCAL,
            BlobstoreConfig::Other { provider, .. } => provider,
        }
    }
}

impl Default for BlobstoreConfig {
    fn default() -> Self {
        BlobstoreConfig::Local(LocalOptions {
            blobstore_path: DEFAULT_LOCAL_BLOBSTORE_PATH.to_string(),
        })
    }
}

/// Options of the WebDAV blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DavOptions {
    /// Base URL of the DAV server.
    pub endpoint: String,
    /// Basic-auth user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Basic-auth password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Options of the local blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalOptions {
    /// Directory holding the blobs.
    pub blobstore_path: String,
}

/// Blob store options that do not fit their provider's schema.
#[derive(Debug, Error)]
#[error("invalid {provider} blobstore options: {cause}")]
pub struct BlobstoreError {
    provider: String,
    cause: serde_json::Error,
}

#[derive(Serialize, Deserialize)]
struct RawBlobstore {
    provider: String,
    #[serde(default)]
    options: BTreeMap<String, Value>,
}

impl TryFrom<RawBlobstore> for BlobstoreConfig {
    type Error = BlobstoreError;

    fn try_from(raw: RawBlobstore) -> Result<Self, Self::Error> {
        let typed = |provider: &str, options: BTreeMap<String, Value>| {
            let object: Map<String, Value> = options.into_iter().collect();
            (provider.to_string(), Value::Object(object))
        };

        match raw.provider.as_str() {
            PROVIDER_DAV => {
                let (provider, value) = typed(PROVIDER_DAV, raw.options);
                serde_json::from_value(value)
                    .map(BlobstoreConfig::Dav)
                    .map_err(|cause| BlobstoreError { provider, cause })
            }
            PROVIDER_LOCAL => {
                let (provider, value) = typed(PROVIDER_LOCAL, raw.options);
                serde_json::from_value(value)
                    .map(BlobstoreConfig::Local)
                    .map_err(|cause| BlobstoreError { provider, cause })
            }
            _ => Ok(BlobstoreConfig::Other {
                provider: raw.provider,
                options: raw.options,
            }),
        }
    }
}

impl From<BlobstoreConfig> for RawBlobstore {
    fn from(config: BlobstoreConfig) -> Self {
        match config {
            BlobstoreConfig::Dav(dav) => {
                let mut options = BTreeMap::new();
                options.insert("endpoint".to_string(), Value::String(dav.endpoint));
                if let Some(user) = dav.user {
                    options.insert("user".to_string(), Value::String(user));
                }
                if let Some(password) = dav.password {
                    options.insert("password".to_string(), Value::String(password));
                }
                RawBlobstore {
                    provider: PROVIDER_DAV.to_string(),
                    options,
                }
            }
            BlobstoreConfig::Local(local) => {
                let mut options = BTreeMap::new();
                options.insert(
                    "blobstore_path".to_string(),
                    Value::String(local.blobstore_path),
                );
                RawBlobstore {
                    provider: PROVIDER_LOCAL.to_string(),
                    options,
                }
            }
            BlobstoreConfig::Other { provider, options } => RawBlobstore { provider, options },
        }
    }
}
