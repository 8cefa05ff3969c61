//! End-to-end: real WebSocket clients → listener → router → registry, with a stub rate source.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;

use chat_server::keepalive::SessionSettings;
use chat_server::listener::RelayListener;
use chat_server::rates::{LookupError, RateAggregator, RateSource};
use chat_server::registry::ConnectionRegistry;
use chat_server::router::MessageRouter;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct FixedSource;

#[async_trait]
impl RateSource for FixedSource {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn fetch_rate(&self, _currency: &str, _date: NaiveDate) -> Result<String, LookupError> {
        Ok("41.25".to_string())
    }
}

struct Relay {
    addr: SocketAddr,
    registry: Arc<ConnectionRegistry>,
    shutdown: CancellationToken,
}

impl Relay {
    async fn start() -> Self {
        let listener = RelayListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let registry = Arc::new(ConnectionRegistry::new());
        let router = Arc::new(MessageRouter::new(
            Arc::clone(&registry),
            RateAggregator::new(Arc::new(FixedSource), 10),
            SessionSettings {
                ping_interval: Duration::from_secs(3600),
                idle_timeout: Duration::from_secs(3600),
            },
        ));
        let shutdown = CancellationToken::new();
        tokio::spawn(listener.serve(router, shutdown.clone()));
        Self {
            addr,
            registry,
            shutdown,
        }
    }

    async fn connect(&self) -> Client {
        let (ws, _) = connect_async(format!("ws://{}", self.addr)).await.unwrap();
        ws
    }

    /// Poll until the registry holds exactly `n` connections.
    async fn wait_for_members(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.registry.len() != n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("registry never reached {n} members (has {})", self.registry.len()));
    }
}

async fn next_text(ws: &mut Client) -> String {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => return text.as_str().to_string(),
                Some(Ok(_)) => continue,
                other => panic!("connection ended while waiting for text: {other:?}"),
            }
        }
    })
    .await
    .expect("timed out waiting for a text frame")
}

async fn assert_silent(ws: &mut Client) {
    let got = tokio::time::timeout(Duration::from_millis(150), ws.next()).await;
    assert!(got.is_err(), "expected no frame, got {got:?}");
}

#[tokio::test]
async fn chat_is_relayed_to_others_only() {
    let relay = Relay::start().await;
    let mut a = relay.connect().await;
    let mut b = relay.connect().await;
    let mut c = relay.connect().await;
    relay.wait_for_members(3).await;

    a.send(Message::text("hello everyone")).await.unwrap();

    let to_b = next_text(&mut b).await;
    let to_c = next_text(&mut c).await;
    assert!(to_b.ends_with(": hello everyone"), "{to_b}");
    assert_eq!(to_b, to_c);
    assert_silent(&mut a).await;

    relay.shutdown.cancel();
}

#[tokio::test]
async fn exchange_reply_goes_to_the_sender_only() {
    let relay = Relay::start().await;
    let mut a = relay.connect().await;
    let mut b = relay.connect().await;
    relay.wait_for_members(2).await;

    a.send(Message::text("exchange 2 USD EUR")).await.unwrap();

    let reply = next_text(&mut a).await;
    let lines: Vec<&str> = reply.lines().collect();
    assert_eq!(lines.len(), 1 + 2 * (1 + 2));
    assert_eq!(lines[0], "Exchange rates for the last 2 days:");
    assert_eq!(lines[1], "Exchange rates for USD:");
    assert!(lines[2].ends_with(", 1 USD = 41.25 UAH"));
    assert_eq!(lines[4], "Exchange rates for EUR:");
    assert_silent(&mut b).await;

    a.send(Message::text("exchange abc USD")).await.unwrap();
    assert_eq!(
        next_text(&mut a).await,
        "Error: command format should be 'exchange <days> <currency...>'"
    );
    assert_silent(&mut b).await;

    relay.shutdown.cancel();
}

#[tokio::test]
async fn closing_a_client_unregisters_it() {
    let relay = Relay::start().await;
    let mut a = relay.connect().await;
    let mut b = relay.connect().await;
    relay.wait_for_members(2).await;

    b.close(None).await.unwrap();
    relay.wait_for_members(1).await;

    a.send(Message::text("anyone?")).await.unwrap();
    assert_silent(&mut a).await;

    drop(a);
    relay.wait_for_members(0).await;
    relay.shutdown.cancel();
}

#[tokio::test]
async fn shutdown_closes_live_sessions() {
    let relay = Relay::start().await;
    let _a = relay.connect().await;
    let _b = relay.connect().await;
    relay.wait_for_members(2).await;

    relay.shutdown.cancel();

    relay.wait_for_members(0).await;
}
