//! Outbound UDP relay shared by all connections of both pipelines.

use std::net::IpAddr;

use tokio::net::UdpSocket;

use crate::error::{RelayError, Result};

/// One unconnected UDP socket relaying messages to local consumers.
///
/// `send_to` takes `&self` and each call transmits one whole datagram, so
/// a single `UdpRelay` behind an `Arc` is safe for concurrent use by every
/// connection task — sends never interleave within a payload. Delivery is
/// fire-and-forget: no acknowledgment, no retry.
#[derive(Debug)]
pub struct UdpRelay {
    socket: UdpSocket,
    host: IpAddr,
}

impl UdpRelay {
    /// Bind an ephemeral local port for sending to `relay_host`.
    pub async fn new(relay_host: &str) -> Result<Self> {
        let host: IpAddr = relay_host
            .parse()
            .map_err(|_| RelayError::Config(format!("invalid relay host: {}", relay_host)))?;
        let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
        Ok(Self { socket, host })
    }

    /// Send one message as a single datagram to `port` on the relay host.
    pub async fn send(&self, payload: &[u8], port: u16) -> Result<()> {
        self.socket.send_to(payload, (self.host, port)).await?;
        Ok(())
    }
}
