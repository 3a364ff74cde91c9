//! Bounded, cancellable wait for a provider transaction.

use super::ProviderClient;
use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Transaction group a new guest runs through before it is usable.
pub const SERVICE_SETUP_TRANSACTION: &str = "Service Setup";

/// Cancellation signal shared between a waiter and whoever may abort it.
///
/// Clones share state: cancelling any clone wakes every waiter.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelState>,
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

impl CancelToken {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel, waking any thread blocked in [`CancelToken::wait_for`].
    pub fn cancel(&self) {
        let mut cancelled = self.inner.cancelled.lock();
        *cancelled = true;
        self.inner.wake.notify_all();
    }

    /// Whether [`CancelToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock()
    }

    /// Block for up to `timeout` or until cancelled, whichever comes first.
    ///
    /// A timeout too large to represent as a deadline blocks until
    /// cancellation. Returns `true` if cancelled.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let mut cancelled = self.inner.cancelled.lock();
        if !*cancelled {
            // Only `cancel` notifies, and parking_lot has no spurious wakeups.
            self.inner.wake.wait_for(&mut cancelled, timeout);
        }
        *cancelled
    }
}

/// Poll until the guest's last transaction is a completed `group` transaction.
///
/// Polls every `poll_interval` until `timeout` has elapsed. Failures to read
/// the transaction are logged and retried; the most recent one is reported
/// in the timeout error. Nothing else is retried here. A `timeout` too large
/// to represent as a deadline never expires.
///
/// # Errors
///
/// [`Error::Config`] for a zero `poll_interval`, before any read.
/// [`Error::ProvisionTimeout`] once the deadline passes, [`Error::Cancelled`]
/// if `cancel` fires first.
pub fn wait_for_last_complete_transaction(
    client: &dyn ProviderClient,
    instance_id: u64,
    group: &str,
    timeout: Duration,
    poll_interval: Duration,
    cancel: &CancelToken,
) -> Result<()> {
    if poll_interval.is_zero() {
        return Err(Error::config(
            "wait for transaction",
            "poll interval must be non-zero",
        ));
    }

    let started = Instant::now();
    let deadline = started.checked_add(timeout);
    let mut last_error: Option<String> = None;
    let mut attempts = 0u32;

    let cancelled = || Error::Cancelled {
        instance_id,
        transaction: group.to_string(),
    };

    loop {
        if cancel.is_cancelled() {
            return Err(cancelled());
        }

        attempts += 1;
        match client.get_last_transaction(instance_id) {
            Ok(Some(tx)) if tx.is_complete(group) => {
                tracing::info!(
                    instance_id,
                    transaction = group,
                    attempts,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "transaction complete"
                );
                return Ok(());
            }
            Ok(Some(tx)) => {
                tracing::debug!(
                    instance_id,
                    group = tx.group.as_deref().unwrap_or(""),
                    status = %tx.status,
                    attempts,
                    "transaction not complete yet"
                );
            }
            Ok(None) => {
                tracing::debug!(instance_id, attempts, "no transaction reported yet");
            }
            Err(e) => {
                tracing::warn!(instance_id, attempts, error = %e, "transaction status read failed");
                last_error = Some(e.to_string());
            }
        }

        let sleep = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(Error::ProvisionTimeout {
                        instance_id,
                        transaction: group.to_string(),
                        timeout,
                        last_error,
                    });
                }
                poll_interval.min(remaining)
            }
            None => poll_interval,
        };

        if cancel.wait_for(sleep) {
            return Err(cancelled());
        }
    }
}
