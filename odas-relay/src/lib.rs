//! Streaming relay for ODAS sound-source data
//!
//! ODAS streams tracked and potential sound sources as JSON objects
//! concatenated over TCP. This crate reassembles those streams into
//! discrete messages (via `odas-framing`) and fans each message out to a
//! UDP relay, a named-channel notification sink and a liveness channel.
//! Two identical pipeline instances run side by side:
//!
//! | Instance  | TCP in | UDP out | Channel        |
//! |-----------|--------|---------|----------------|
//! | tracking  | 9000   | 9900    | `newTracking`  |
//! | potential | 9001   | 9901    | `newPotential` |
//!
//! Sink deliveries are isolated: a detached or failing notification
//! consumer never affects the UDP relay and never disturbs framing state.
//! Each connection owns its buffering, so concurrent sources cannot
//! corrupt one another.
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use odas_relay::{
//!     LogObserver, Pipeline, PipelineConfig, RelayConfig, StandaloneMonitor, UdpRelay,
//!     CHANNEL_TRACKING,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RelayConfig::default();
//!     let relay = Arc::new(UdpRelay::new(&config.relay_host).await?);
//!
//!     let tracking = Pipeline::bind(
//!         PipelineConfig {
//!             name: "tracking".into(),
//!             listen_port: config.tracking.listen_port,
//!             relay_port: config.tracking.relay_port,
//!             channel: CHANNEL_TRACKING.into(),
//!             max_pending_bytes: config.max_pending_bytes,
//!         },
//!         relay,
//!         Arc::new(LogObserver),
//!         Arc::new(StandaloneMonitor),
//!     )
//!     .await?;
//!
//!     tracking.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod observer;
pub mod pipeline;
pub mod sink;

// Re-exports
pub use config::{EndpointConfig, RelayConfig};
pub use dispatch::{Dispatcher, SinkSet};
pub use error::{RelayError, Result};
pub use observer::{
    DetachedObserver, LogObserver, Observer, PipelineMonitor, StandaloneMonitor,
    CHANNEL_POTENTIAL, CHANNEL_REMOTE_OFFLINE, CHANNEL_REMOTE_ONLINE, CHANNEL_TRACKING,
};
pub use pipeline::{Pipeline, PipelineConfig};
pub use sink::UdpRelay;
