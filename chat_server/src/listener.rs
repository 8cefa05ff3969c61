//! TCP/WebSocket accept loop.
//!
//! Every accepted socket gets a bounded WebSocket handshake, then two halves: the
//! reader side runs the router's session loop and a writer task drains the
//! connection's outbox into the sink. Cancelling the shutdown token stops accepting
//! and aborts the live sessions, which unregisters them.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chat_common::{ChatError, Result};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};
use tokio_util::sync::CancellationToken;

use crate::router::MessageRouter;

/// Upper bound for a client to complete the WebSocket upgrade.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// WebSocket listener that hands every accepted connection to the router.
///
/// Each connection runs as its own task: the socket is split into a reader, driven by
/// [`MessageRouter::run_session`], and a writer task that drains the connection's
/// outbox into the sink.
pub struct RelayListener {
    /// The underlying TCP listening socket.
    pub(crate) socket: TcpListener,
}

impl RelayListener {
    /// Bind a new listener to the provided `bind_addr` (e.g., `localhost:8765`).
    pub async fn bind(bind_addr: &str) -> Result<Self> {
        let socket = TcpListener::bind(bind_addr).await?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Accept connections until `shutdown` is cancelled, then abort the live sessions.
    ///
    /// Accept and handshake errors are logged per peer and never stop the loop.
    pub async fn serve(self, router: Arc<MessageRouter>, shutdown: CancellationToken) {
        match self.socket.local_addr() {
            Ok(addr) => info!("Chat server is started on ws://{}", addr),
            Err(e) => warn!("Chat server is started, local address unknown: {}", e),
        }

        let mut sessions = JoinSet::new();
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.socket.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!("TCP connection from {}", peer);
                        let router = Arc::clone(&router);
                        sessions.spawn(async move {
                            if let Err(e) = handle_connection(stream, peer, router).await {
                                warn!("Connection {} failed: {}", peer, e);
                            }
                        });
                    }
                    Err(e) => error!("TCP accept error: {}", e),
                },
                Some(joined) = sessions.join_next(), if !sessions.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            error!("Session task panicked: {}", e);
                        }
                    }
                }
            }
        }

        info!("Shutting down, closing {} session(s)", sessions.len());
        sessions.shutdown().await;
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, router: Arc<MessageRouter>) -> Result<()> {
    let ws = tokio::time::timeout(HANDSHAKE_TIMEOUT, accept_async(stream))
        .await
        .map_err(|_| ChatError::Timeout(format!("WebSocket handshake with {}", peer)))??;

    let (sink, source) = ws.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();
    let writer = tokio::spawn(writer_task(sink, rx));

    router.run_session(peer, source, tx).await;

    // The session has dropped its outbox; let the writer flush what is queued.
    if let Err(e) = writer.await {
        debug!("Writer task for {} ended abnormally: {}", peer, e);
    }
    Ok(())
}

/// Forward queued frames to the socket until the outbox closes, a Close frame is
/// written, or the peer stops accepting data.
async fn writer_task(
    mut sink: SplitSink<WebSocketStream<TcpStream>, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(message) = rx.recv().await {
        let is_close = matches!(message, Message::Close(_));
        if let Err(e) = sink.send(message).await {
            debug!("WebSocket send failed: {}", e);
            return;
        }
        if is_close {
            return;
        }
    }
    let _ = sink.close().await;
}
