//! TCP listener and per-connection handling for one pipeline instance.

use std::net::SocketAddr;
use std::sync::Arc;

use odas_framing::Reassembler;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

use crate::dispatch::{Dispatcher, SinkSet};
use crate::error::Result;
use crate::observer::{Observer, PipelineMonitor};
use crate::sink::UdpRelay;

const READ_BUF_SIZE: usize = 4096;

/// Static parameters of one pipeline instance.
///
/// The tracking and potential pipelines run the same code with different
/// values here; nothing else distinguishes them.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Label used in logs ("tracking" / "potential").
    pub name: String,
    pub listen_port: u16,
    pub relay_port: u16,
    /// Notification channel reconstructed messages go out on.
    pub channel: String,
    pub max_pending_bytes: usize,
}

/// One listening endpoint plus everything its connections fan out to.
pub struct Pipeline {
    cfg: PipelineConfig,
    listener: TcpListener,
    relay: Arc<UdpRelay>,
    observer: Arc<dyn Observer>,
    monitor: Arc<dyn PipelineMonitor>,
}

impl Pipeline {
    /// Bind the listening endpoint. Port 0 binds an ephemeral port;
    /// [`local_addr`](Pipeline::local_addr) reports what was chosen.
    pub async fn bind(
        cfg: PipelineConfig,
        relay: Arc<UdpRelay>,
        observer: Arc<dyn Observer>,
        monitor: Arc<dyn PipelineMonitor>,
    ) -> Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", cfg.listen_port)).await?;
        info!(
            "{} server listening on {}, relaying to UDP port {}",
            cfg.name,
            listener.local_addr()?,
            cfg.relay_port
        );
        Ok(Self {
            cfg,
            listener,
            relay,
            observer,
            monitor,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, one handler task per connection.
    ///
    /// Every connection gets its own reassembler and dispatcher, so
    /// concurrent clients can never contaminate each other's framing
    /// state.
    pub async fn run(self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    info!("new {} client from {}", self.cfg.name, peer);
                    let sinks = SinkSet {
                        relay: Arc::clone(&self.relay),
                        relay_port: self.cfg.relay_port,
                        channel: self.cfg.channel.clone(),
                        observer: Arc::clone(&self.observer),
                        monitor: Arc::clone(&self.monitor),
                    };
                    let name = self.cfg.name.clone();
                    let max_pending = self.cfg.max_pending_bytes;
                    tokio::spawn(async move {
                        handle_connection(stream, peer, name, sinks, max_pending).await;
                    });
                }
                Err(e) => {
                    error!("{} accept failed: {}", self.cfg.name, e);
                }
            }
        }
    }
}

/// Drive one connection from open to close.
///
/// A read error is recorded but does not discard buffered state by itself;
/// the loop ends because the transport can deliver nothing further, and
/// the close path then runs exactly once. Pending data still in the buffer
/// at close is discarded, not flushed — a tail that never saw a boundary
/// never terminated on the wire.
async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    name: String,
    sinks: SinkSet,
    max_pending_bytes: usize,
) {
    let mut reassembler = Reassembler::new(max_pending_bytes);
    let mut dispatcher = Dispatcher::new(sinks);
    let mut buf = vec![0u8; READ_BUF_SIZE];

    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                for message in reassembler.feed(&buf[..n]) {
                    dispatcher.dispatch(&message).await;
                }
            }
            Err(e) => {
                error!("{} connection error from {}: {}", name, peer, e);
                break;
            }
        }
    }

    if !reassembler.pending().is_empty() {
        debug!(
            "{} connection from {} closed with {} bytes pending, discarded",
            name,
            peer,
            reassembler.pending().len()
        );
    }
    dispatcher.connection_closed();
    info!("{} connection from {} closed", name, peer);
}
