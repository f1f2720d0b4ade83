//! Shutdown and drain behavior of the accept loop.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use seikan::net::{Listener, ListenerError};
use seikan::{Forwarder, Shutdown};

mod common;

#[tokio::test]
async fn test_idle_forwarder_stops_promptly() {
    let echo = common::start_echo_server().await;
    let harness = common::start_forwarder(common::local_config(echo));
    let addr = harness.addr;

    tokio::time::sleep(Duration::from_millis(50)).await;
    let tracker = harness.tracker.clone();
    harness.stop(Duration::from_millis(500)).await;

    assert_eq!(tracker.total(), 0);
    assert!(TcpStream::connect(addr).await.is_err(), "listener still open after stop");
}

#[tokio::test]
async fn test_active_sessions_drain_before_exit() {
    let echo = common::start_echo_server().await;
    let harness = common::start_forwarder(common::local_config(echo));

    let mut clients = Vec::new();
    for _ in 0..3 {
        let mut client = TcpStream::connect(harness.addr).await.unwrap();
        client.write_all(b"ping").await.unwrap();
        let mut buf = [0u8; 4];
        client.read_exact(&mut buf).await.unwrap();
        clients.push(client);
    }
    assert_eq!(harness.tracker.relaying(), 3);

    let tracker = harness.tracker.clone();
    harness.stop(Duration::from_secs(2)).await;
    assert_eq!(tracker.active_count(), 0);

    // Every client is told the relay ended.
    for mut client in clients {
        let mut buf = [0u8; 4];
        let read = tokio::time::timeout(Duration::from_secs(1), client.read(&mut buf))
            .await
            .expect("client left hanging");
        assert!(matches!(read, Ok(0) | Err(_)));
    }
}

#[tokio::test]
async fn test_queued_client_not_admitted_after_shutdown() {
    let echo = common::start_echo_server().await;
    let harness = common::start_forwarder(common::local_config(echo).with_max_connections(1));

    let mut active = TcpStream::connect(harness.addr).await.unwrap();
    active.write_all(b"x").await.unwrap();
    let mut buf = [0u8; 1];
    active.read_exact(&mut buf).await.unwrap();

    // Sits in the backlog while the only slot is taken.
    let mut queued = TcpStream::connect(harness.addr).await.unwrap();

    let tracker = harness.tracker.clone();
    harness.stop(Duration::from_secs(2)).await;
    assert_eq!(tracker.total(), 1);

    let mut buf = [0u8; 1];
    let read = tokio::time::timeout(Duration::from_secs(1), queued.read(&mut buf))
        .await
        .expect("queued client left hanging");
    assert!(matches!(read, Ok(0) | Err(_)));
}

#[tokio::test]
async fn test_run_reports_bind_failure() {
    let taken = Listener::bind("127.0.0.1:0".parse().unwrap(), 4).unwrap();
    let config = seikan::ForwardingConfig::new(taken.local_addr(), common::closed_port());

    let shutdown = Shutdown::new();
    let err = Forwarder::new(config).run(shutdown.subscribe()).await.unwrap_err();
    assert!(matches!(err, ListenerError::Bind { .. }));
}
