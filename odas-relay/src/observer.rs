//! Capabilities exposed by the external consumer (the GUI surface).
//!
//! The relay never reaches into the consumer's object graph; it only talks
//! through these two traits, injected at pipeline construction. Both must
//! be cheap and non-blocking — they are called from the hot dispatch path.

use tracing::debug;

use crate::error::{RelayError, Result};

/// Notification channel carrying reconstructed tracking messages.
pub const CHANNEL_TRACKING: &str = "newTracking";

/// Notification channel carrying reconstructed potential-source messages.
pub const CHANNEL_POTENTIAL: &str = "newPotential";

/// A remote source became reachable (first data on a connection).
pub const CHANNEL_REMOTE_ONLINE: &str = "remote-online";

/// A remote source became unreachable (its connection closed).
pub const CHANNEL_REMOTE_OFFLINE: &str = "remote-offline";

/// Receiver of named-channel notifications.
///
/// When [`is_attached`](Observer::is_attached) is false, callers skip
/// delivery silently; a notification is never fatal to the relay either
/// way. Implementations must tolerate concurrent calls from multiple
/// connection tasks.
pub trait Observer: Send + Sync {
    /// Is the consumer currently able to receive notifications?
    fn is_attached(&self) -> bool;

    /// Deliver one payload on a named channel.
    fn notify(&self, channel: &str, payload: &str) -> Result<()>;
}

/// Liveness query: is a local processing pipeline running?
///
/// When it is not, incoming data must come from a remote source, and the
/// dispatcher announces [`CHANNEL_REMOTE_ONLINE`].
pub trait PipelineMonitor: Send + Sync {
    fn is_active(&self) -> bool;
}

/// Observer for standalone operation: logs every notification.
#[derive(Debug, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn is_attached(&self) -> bool {
        true
    }

    fn notify(&self, channel: &str, payload: &str) -> Result<()> {
        debug!("notify {}: {} bytes", channel, payload.len());
        Ok(())
    }
}

/// Observer that is never attached (no GUI connected).
#[derive(Debug, Default)]
pub struct DetachedObserver;

impl Observer for DetachedObserver {
    fn is_attached(&self) -> bool {
        false
    }

    fn notify(&self, _channel: &str, _payload: &str) -> Result<()> {
        Err(RelayError::ObserverDetached)
    }
}

/// Monitor for standalone operation: no local pipeline ever runs, so every
/// source is remote.
#[derive(Debug, Default)]
pub struct StandaloneMonitor;

impl PipelineMonitor for StandaloneMonitor {
    fn is_active(&self) -> bool {
        false
    }
}
