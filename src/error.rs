//! Error types for slcpi.
//!
//! # Error Message Style Guide
//!
//! All error messages follow the same format:
//!
//! - **Format**: `"<operation> failed: <reason>"`
//! - **Case**: All lowercase (Rust convention for error messages)
//! - **Context**: Include the virtual guest id, path, or field when available
//!
//! ```text
//! "virtual guest creation failed: provider create_object failed: quota exceeded"
//! "ephemeral disk attach failed: virtual guest 1234: ..."
//! "agent env download failed: /var/vcap/bosh/user_data.json: no such file"
//! ```
//!
//! Errors raised by a provisioning step carry the underlying failure as a
//! `cause` field rendered into their own message. They expose no separate
//! `source()`, so chain-walking reporters print each cause once.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using slcpi's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in slcpi operations.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Provisioning Errors
    // ========================================================================
    /// The virtual guest template could not be built from the inputs.
    #[error("virtual guest template build failed: {0}")]
    TemplateBuild(String),

    /// The provider rejected the creation request.
    #[error("virtual guest creation failed: {cause}")]
    ProviderCreate {
        /// Underlying provider failure.
        cause: Box<Error>,
    },

    /// The setup transaction did not complete before the deadline.
    #[error(
        "wait for {transaction} transaction failed: virtual guest {instance_id} not ready after {}{}",
        humantime::format_duration(*timeout),
        last_error_suffix(last_error)
    )]
    ProvisionTimeout {
        /// Virtual guest id.
        instance_id: u64,
        /// Transaction group that was awaited.
        transaction: String,
        /// Configured ceiling.
        timeout: Duration,
        /// Last status-read failure seen while polling, if any.
        last_error: Option<String>,
    },

    /// The wait for the setup transaction was cancelled.
    #[error("wait for {transaction} transaction failed: virtual guest {instance_id}: cancelled")]
    Cancelled {
        /// Virtual guest id.
        instance_id: u64,
        /// Transaction group that was awaited.
        transaction: String,
    },

    /// Attaching the ephemeral disk failed.
    #[error("ephemeral disk attach failed: virtual guest {instance_id}: {cause}")]
    DiskAttach {
        /// Virtual guest id.
        instance_id: u64,
        /// Underlying provider failure.
        cause: Box<Error>,
    },

    /// Fetching the virtual guest's details failed.
    #[error("virtual guest detail fetch failed: virtual guest {instance_id}: {cause}")]
    DetailFetch {
        /// Virtual guest id.
        instance_id: u64,
        /// Underlying provider failure.
        cause: Box<Error>,
    },

    /// Writing the agent environment to the new guest failed.
    #[error("agent env delivery failed: virtual guest {instance_id}: {cause}")]
    Delivery {
        /// Virtual guest id.
        instance_id: u64,
        /// Underlying failure.
        cause: Box<Error>,
    },

    // ========================================================================
    // Endpoint Errors
    // ========================================================================
    /// A connection URL could not be parsed or rebuilt.
    #[error("endpoint rewrite failed: invalid {field}: {reason}")]
    MalformedEndpoint {
        /// Part of the URL that is at fault (`url`, `host`).
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    // ========================================================================
    // Agent Env Errors
    // ========================================================================
    /// Moving the settings document to or from the guest failed.
    #[error("agent env {operation} failed: {path}: {cause}")]
    Transfer {
        /// `download` or `upload`.
        operation: &'static str,
        /// Guest path involved.
        path: String,
        /// Underlying transport failure.
        cause: std::io::Error,
    },

    /// Encoding the settings document failed.
    #[error(transparent)]
    Encode(#[from] slcpi_agent_env::EncodeError),

    /// Decoding the settings document failed.
    #[error(transparent)]
    Decode(#[from] slcpi_agent_env::DecodeError),

    /// The settings registry rejected a request.
    #[error("registry operation failed: {operation}: {reason}")]
    Registry {
        /// The registry operation (e.g., "fetch settings").
        operation: String,
        /// The reason for the failure.
        reason: String,
    },

    // ========================================================================
    // Provider Errors
    // ========================================================================
    /// A provider API call failed.
    #[error("provider {operation} failed: {reason}")]
    Provider {
        /// The API call (e.g., "create_object").
        operation: String,
        /// The reason for the failure.
        reason: String,
    },

    // ========================================================================
    // Host Errors
    // ========================================================================
    /// Updating the local hosts file failed.
    #[error("hosts file update failed: {}: {cause}", path.display())]
    HostsFile {
        /// Hosts file path.
        path: PathBuf,
        /// Underlying IO failure.
        cause: std::io::Error,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration operation failed.
    #[error("config operation failed: {operation}: {reason}")]
    Config {
        /// The operation that failed (e.g., "load", "validate").
        operation: String,
        /// The reason for the failure.
        reason: String,
    },
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    match last_error {
        Some(e) => format!(" (last status error: {})", e),
        None => String::new(),
    }
}

impl Error {
    /// Create a template build error.
    pub fn template_build(reason: impl Into<String>) -> Self {
        Self::TemplateBuild(reason.into())
    }

    /// Create a malformed endpoint error.
    pub fn malformed_endpoint(field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedEndpoint {
            field,
            reason: reason.into(),
        }
    }

    /// Create a provider API error.
    pub fn provider(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Provider {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a registry error.
    pub fn registry(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Registry {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a config operation error.
    pub fn config(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Virtual guest id the error refers to, if any.
    ///
    /// Operators use this to find and clean up a half-provisioned guest.
    pub fn instance_id(&self) -> Option<u64> {
        match self {
            Error::ProvisionTimeout { instance_id, .. }
            | Error::Cancelled { instance_id, .. }
            | Error::DiskAttach { instance_id, .. }
            | Error::DetailFetch { instance_id, .. }
            | Error::Delivery { instance_id, .. } => Some(*instance_id),
            _ => None,
        }
    }
}
