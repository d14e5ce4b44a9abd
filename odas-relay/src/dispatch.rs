//! Fan-out of one reconstructed message to the instance's sink set.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::observer::{Observer, PipelineMonitor, CHANNEL_REMOTE_OFFLINE, CHANNEL_REMOTE_ONLINE};
use crate::sink::UdpRelay;

/// The delivery targets of one pipeline instance.
#[derive(Clone)]
pub struct SinkSet {
    pub relay: Arc<UdpRelay>,
    pub relay_port: u16,
    /// Notification channel for reconstructed messages
    /// (`newTracking` / `newPotential`).
    pub channel: String,
    pub observer: Arc<dyn Observer>,
    pub monitor: Arc<dyn PipelineMonitor>,
}

/// Per-connection fan-out dispatcher.
///
/// Each sink is attempted in isolation: one sink failing is logged and
/// never stops the others, never reaches the reassembler, never touches
/// pending state. No cross-sink ordering is promised. The liveness latch
/// is per connection, which is why the dispatcher lives with the
/// connection handler rather than the pipeline.
pub struct Dispatcher {
    sinks: SinkSet,
    online_announced: bool,
    offline_signalled: bool,
}

impl Dispatcher {
    pub fn new(sinks: SinkSet) -> Self {
        Self {
            sinks,
            online_announced: false,
            offline_signalled: false,
        }
    }

    /// Deliver one message to the UDP relay, the notification channel and
    /// the liveness channel.
    pub async fn dispatch(&mut self, message: &str) {
        if let Err(e) = self
            .sinks
            .relay
            .send(message.as_bytes(), self.sinks.relay_port)
            .await
        {
            warn!("UDP relay to port {} failed: {}", self.sinks.relay_port, e);
        }

        if self.sinks.observer.is_attached() {
            if let Err(e) = self.sinks.observer.notify(&self.sinks.channel, message) {
                warn!("notification on {} failed: {}", self.sinks.channel, e);
            }
        } else {
            debug!("observer detached, skipping {} notification", self.sinks.channel);
        }

        // First message while no local pipeline runs: the source must be a
        // remote one that just came up. Announce once per connection.
        if !self.online_announced
            && !self.sinks.monitor.is_active()
            && self.sinks.observer.is_attached()
        {
            match self.sinks.observer.notify(CHANNEL_REMOTE_ONLINE, "") {
                Ok(()) => self.online_announced = true,
                Err(e) => warn!("remote-online notification failed: {}", e),
            }
        }
    }

    /// Signal that the source became unreachable. Safe to call more than
    /// once; only the first call notifies.
    pub fn connection_closed(&mut self) {
        if self.offline_signalled {
            return;
        }
        self.offline_signalled = true;

        if !self.sinks.observer.is_attached() {
            debug!("observer detached, skipping remote-offline notification");
            return;
        }
        if let Err(e) = self.sinks.observer.notify(CHANNEL_REMOTE_OFFLINE, "") {
            warn!("remote-offline notification failed: {}", e);
        }
    }
}
