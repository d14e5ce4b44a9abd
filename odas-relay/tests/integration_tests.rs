use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};

use odas_relay::{
    Observer, Pipeline, PipelineConfig, PipelineMonitor, Result, UdpRelay,
    CHANNEL_REMOTE_OFFLINE, CHANNEL_REMOTE_ONLINE,
};

/// Observer that records every notification it receives.
#[derive(Default)]
struct RecordingObserver {
    calls: Mutex<Vec<(String, String)>>,
}

impl Observer for RecordingObserver {
    fn is_attached(&self) -> bool {
        true
    }

    fn notify(&self, channel: &str, payload: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((channel.to_owned(), payload.to_owned()));
        Ok(())
    }
}

impl RecordingObserver {
    fn payloads_on(&self, channel: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == channel)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

/// Observer whose every notification fails.
struct FailingObserver;

impl Observer for FailingObserver {
    fn is_attached(&self) -> bool {
        true
    }

    fn notify(&self, _channel: &str, _payload: &str) -> Result<()> {
        Err(odas_relay::RelayError::NotifyFailed("always fails".into()))
    }
}

struct RemoteOnlyMonitor;

impl PipelineMonitor for RemoteOnlyMonitor {
    fn is_active(&self) -> bool {
        false
    }
}

struct TestHarness {
    observer: Arc<RecordingObserver>,
    udp_receiver: UdpSocket,
    tcp_addr: std::net::SocketAddr,
}

/// Bind a pipeline on ephemeral ports with a UDP receiver standing in for
/// the downstream consumer.
async fn start_pipeline(observer: Arc<dyn Observer>) -> (UdpSocket, std::net::SocketAddr) {
    let udp_receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let relay_port = udp_receiver.local_addr().unwrap().port();

    let relay = Arc::new(UdpRelay::new("127.0.0.1").await.unwrap());
    let pipeline = Pipeline::bind(
        PipelineConfig {
            name: "tracking".to_string(),
            listen_port: 0,
            relay_port,
            channel: "newTracking".to_string(),
            max_pending_bytes: 1024 * 1024,
        },
        relay,
        observer,
        Arc::new(RemoteOnlyMonitor),
    )
    .await
    .unwrap();

    let tcp_addr = pipeline.local_addr().unwrap();
    tokio::spawn(pipeline.run());

    (udp_receiver, tcp_addr)
}

async fn start_harness() -> TestHarness {
    let observer = Arc::new(RecordingObserver::default());
    let (udp_receiver, tcp_addr) = start_pipeline(observer.clone()).await;
    TestHarness {
        observer,
        udp_receiver,
        tcp_addr,
    }
}

async fn recv_datagram(socket: &UdpSocket) -> String {
    let mut buf = [0u8; 4096];
    let n = tokio::time::timeout(Duration::from_secs(2), socket.recv(&mut buf))
        .await
        .expect("timed out waiting for datagram")
        .unwrap();
    String::from_utf8(buf[..n].to_vec()).unwrap()
}

#[tokio::test]
async fn relays_messages_split_across_chunks() {
    let harness = start_harness().await;

    let mut client = TcpStream::connect(harness.tcp_addr).await.unwrap();
    // The three-chunk scenario: boundaries never align with writes.
    client.write_all(b"{\"a\":1}\n{").await.unwrap();
    client.write_all(b"\"b\":2}\n{\"c\":3").await.unwrap();
    client.write_all(b"}").await.unwrap();

    assert_eq!(recv_datagram(&harness.udp_receiver).await, r#"{"a":1}"#);
    assert_eq!(recv_datagram(&harness.udp_receiver).await, r#"{"b":2}"#);

    // The tail never saw a boundary: nothing more arrives, even after the
    // connection closes (pending data is discarded, not flushed).
    drop(client);
    let mut buf = [0u8; 64];
    let extra = tokio::time::timeout(
        Duration::from_millis(300),
        harness.udp_receiver.recv(&mut buf),
    )
    .await;
    assert!(extra.is_err(), "pending tail must not be flushed on close");
}

#[tokio::test]
async fn notifies_observer_for_each_message() {
    let harness = start_harness().await;

    let mut client = TcpStream::connect(harness.tcp_addr).await.unwrap();
    client
        .write_all(b"{\"a\":1}\n{\"b\":2}\n{")
        .await
        .unwrap();

    let mut notified = Vec::new();
    for _ in 0..40 {
        notified = harness.observer.payloads_on("newTracking");
        if notified.len() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(notified, vec![r#"{"a":1}"#.to_owned(), r#"{"b":2}"#.to_owned()]);
    for payload in &notified {
        serde_json::from_str::<serde_json::Value>(payload).unwrap();
    }
}

#[tokio::test]
async fn failing_observer_does_not_break_udp_relay() {
    let (udp_receiver, tcp_addr) = start_pipeline(Arc::new(FailingObserver)).await;

    let mut client = TcpStream::connect(tcp_addr).await.unwrap();
    client.write_all(b"{\"a\":1}\n{\"b\":2}\n{").await.unwrap();

    assert_eq!(recv_datagram(&udp_receiver).await, r#"{"a":1}"#);
    assert_eq!(recv_datagram(&udp_receiver).await, r#"{"b":2}"#);
}

#[tokio::test]
async fn liveness_signals_online_once_and_offline_on_close() {
    let harness = start_harness().await;

    let mut client = TcpStream::connect(harness.tcp_addr).await.unwrap();
    client
        .write_all(b"{\"a\":1}\n{\"b\":2}\n{\"c\":3}\n{")
        .await
        .unwrap();

    for _ in 0..3 {
        recv_datagram(&harness.udp_receiver).await;
    }
    assert_eq!(harness.observer.payloads_on(CHANNEL_REMOTE_ONLINE).len(), 1);
    assert!(harness.observer.payloads_on(CHANNEL_REMOTE_OFFLINE).is_empty());

    client.shutdown().await.unwrap();
    drop(client);

    // Give the handler a moment to observe EOF.
    let mut offline = Vec::new();
    for _ in 0..20 {
        offline = harness.observer.payloads_on(CHANNEL_REMOTE_OFFLINE);
        if !offline.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(offline.len(), 1, "remote-offline must fire exactly once");
    assert_eq!(harness.observer.payloads_on(CHANNEL_REMOTE_ONLINE).len(), 1);
}

#[tokio::test]
async fn concurrent_connections_do_not_share_framing_state() {
    let harness = start_harness().await;

    let mut first = TcpStream::connect(harness.tcp_addr).await.unwrap();
    let mut second = TcpStream::connect(harness.tcp_addr).await.unwrap();

    // Interleave partial writes so any shared buffer would interleave the
    // two messages.
    first.write_all(b"{\"conn\":1,\"x\":").await.unwrap();
    second.write_all(b"{\"conn\":2,\"y\":").await.unwrap();
    first.write_all(b"11}\n{").await.unwrap();
    second.write_all(b"22}\n{").await.unwrap();

    let a = recv_datagram(&harness.udp_receiver).await;
    let b = recv_datagram(&harness.udp_receiver).await;

    let mut got = vec![a, b];
    got.sort();
    assert_eq!(
        got,
        vec![
            r#"{"conn":1,"x":11}"#.to_owned(),
            r#"{"conn":2,"y":22}"#.to_owned(),
        ]
    );
}

#[tokio::test]
async fn multibyte_text_survives_chunk_boundaries_end_to_end() {
    let harness = start_harness().await;

    let wire = "{\"label\":\"caf\u{00e9}\"}\n{".as_bytes().to_vec();
    let cut = wire.iter().position(|&b| b == 0xC3).unwrap() + 1;

    let mut client = TcpStream::connect(harness.tcp_addr).await.unwrap();
    client.write_all(&wire[..cut]).await.unwrap();
    client.flush().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    client.write_all(&wire[cut..]).await.unwrap();

    assert_eq!(
        recv_datagram(&harness.udp_receiver).await,
        "{\"label\":\"caf\u{00e9}\"}"
    );
}
