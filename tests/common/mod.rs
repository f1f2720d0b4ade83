//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use seikan::config::ForwardingConfig;
use seikan::net::{ConnectionTracker, Listener};
use seikan::{Forwarder, Shutdown};

/// Start an echo service that mirrors bytes until the client half-closes.
pub async fn start_echo_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let (mut rx, mut tx) = socket.split();
                        let _ = tokio::io::copy(&mut rx, &mut tx).await;
                        let _ = tx.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a service that reads the whole request, then answers with `reply`
/// followed by the request length.
#[allow(dead_code)]
pub async fn start_reply_after_eof_server(reply: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut request = Vec::new();
                        if socket.read_to_end(&mut request).await.is_err() {
                            return;
                        }
                        // Reply slowly so the client is clearly past its own EOF.
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        let response = format!("{reply}:{}", request.len());
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a service that streams `chunk` every `every`, `ticks` times, then
/// half-closes. The flag is raised if the peer's EOF arrives mid-stream.
#[allow(dead_code)]
pub async fn start_streaming_server(
    chunk: &'static [u8],
    every: Duration,
    ticks: usize,
) -> (SocketAddr, Arc<AtomicBool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cut_off = Arc::new(AtomicBool::new(false));
    let flag = cut_off.clone();

    tokio::spawn(async move {
        let Ok((socket, _)) = listener.accept().await else {
            return;
        };
        let (mut rx, mut tx) = socket.into_split();
        let peer_done = Arc::new(AtomicBool::new(false));
        let reader = {
            let peer_done = peer_done.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 64];
                while let Ok(n) = rx.read(&mut buf).await {
                    if n == 0 {
                        break;
                    }
                }
                peer_done.store(true, Ordering::SeqCst);
            })
        };

        for _ in 0..ticks {
            tokio::time::sleep(every).await;
            if peer_done.load(Ordering::SeqCst) {
                flag.store(true, Ordering::SeqCst);
                break;
            }
            if tx.write_all(chunk).await.is_err() {
                break;
            }
        }
        let _ = tx.shutdown().await;
        let _ = reader.await;
    });

    (addr, cut_off)
}

/// An address nothing listens on.
#[allow(dead_code)]
pub fn closed_port() -> SocketAddr {
    let spare = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    spare.local_addr().unwrap()
}

/// Forwarding parameters for an ephemeral local listener.
pub fn local_config(destination: SocketAddr) -> ForwardingConfig {
    ForwardingConfig::new("127.0.0.1:0".parse().unwrap(), destination)
}

/// A forwarder running in the background.
pub struct Harness {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub tracker: ConnectionTracker,
    pub handle: JoinHandle<()>,
}

impl Harness {
    /// Raise shutdown and wait for the accept loop to drain.
    #[allow(dead_code)]
    pub async fn stop(self, within: Duration) {
        self.shutdown.trigger();
        tokio::time::timeout(within, self.handle)
            .await
            .expect("forwarder did not stop in time")
            .unwrap();
    }
}

pub fn start_forwarder(config: ForwardingConfig) -> Harness {
    let forwarder = Forwarder::new(config);
    let listener = forwarder.bind().unwrap();
    let addr = listener.local_addr();
    let tracker = forwarder.tracker();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(forwarder.serve(listener, shutdown.subscribe()));

    Harness {
        addr,
        shutdown,
        tracker,
        handle,
    }
}

/// A listener whose accept queue is full, so further handshakes stall.
#[allow(dead_code)]
pub async fn saturated_listener() -> (Listener, Vec<TcpStream>) {
    let listener = Listener::bind("127.0.0.1:0".parse().unwrap(), 1).unwrap();
    let addr = listener.local_addr();

    let mut fillers = Vec::new();
    for _ in 0..4 {
        if let Ok(Ok(stream)) =
            tokio::time::timeout(Duration::from_millis(100), TcpStream::connect(addr)).await
        {
            fillers.push(stream);
        }
    }
    (listener, fillers)
}

/// Poll `condition` until it holds or `within` elapses.
#[allow(dead_code)]
pub async fn wait_until(within: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
