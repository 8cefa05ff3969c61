//! Registry of live chat connections.
//!
//! The registry is the only shared mutable state of the server. Sessions register
//! themselves when the handshake completes and unregister when they close; chat lines
//! are fanned out through [`ConnectionRegistry::broadcast`].
//!
//! Concurrency:
//! - Membership lives in a `HashMap` behind a `std::sync::Mutex`. The lock is never held
//!   across an `.await` and never while sending.
//! - Broadcast copies the membership under the lock and delivers from the copy, so
//!   concurrent `register`/`unregister` calls neither block on slow peers nor corrupt the
//!   iteration.
//! - Delivery goes through per-connection unbounded channels (outboxes) drained by each
//!   connection's writer task. A closed outbox means the peer is gone; that send is
//!   counted as failed and the rest of the snapshot still receives the message.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chat_common::{ChatError, Result};
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::names;

/// Sender half of a connection's outbound frame channel.
pub type Outbox = mpsc::UnboundedSender<Message>;

/// Process-unique identifier of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a registered connection.
///
/// Cloning is cheap: the handle only carries identifiers and the outbox sender.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    peer: SocketAddr,
    display_name: String,
    outbox: Outbox,
}

impl Connection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Queue a text frame for this connection.
    pub fn send_text(&self, text: impl Into<String>) -> Result<()> {
        self.send(Message::text(text.into()))
    }

    /// Queue an arbitrary frame for this connection.
    pub fn send(&self, message: Message) -> Result<()> {
        self.outbox
            .send(message)
            .map_err(|_| ChatError::ChannelSend(format!("{} ({}) is gone", self.display_name, self.peer)))
    }
}

/// Outcome of a broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections the message was queued for.
    pub delivered: usize,
    /// Connections whose outbox was already closed.
    pub failed: usize,
}

/// Thread-safe set of live connections keyed by [`ConnectionId`].
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, Connection>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection and assign it a display name unique among live connections.
    pub fn register(&self, peer: SocketAddr, outbox: Outbox) -> Connection {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let connection = {
            let mut connections = self.lock();
            let display_name = names::unique_full_name(&mut rand::rng(), |candidate| {
                connections.values().any(|c| c.display_name == candidate)
            });
            let connection = Connection {
                id,
                peer,
                display_name,
                outbox,
            };
            connections.insert(id, connection.clone());
            connection
        };
        info!("{} connects as {} ({})", peer, connection.display_name, id);
        connection
    }

    /// Remove a connection. Removing an unknown or already removed id is a no-op.
    pub fn unregister(&self, id: ConnectionId) -> Option<Connection> {
        let removed = self.lock().remove(&id);
        match &removed {
            Some(connection) => info!(
                "{} disconnects ({}, {})",
                connection.peer, connection.display_name, id
            ),
            None => debug!("Connection {} already unregistered", id),
        }
        removed
    }

    /// Send `message` to every connection registered at call time except `exclude`.
    pub fn broadcast(&self, message: &str, exclude: Option<ConnectionId>) -> BroadcastReport {
        let recipients: Vec<Connection> = self
            .lock()
            .values()
            .filter(|c| Some(c.id) != exclude)
            .cloned()
            .collect();

        let mut report = BroadcastReport::default();
        for connection in &recipients {
            match connection.send_text(message) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!("Broadcast to {} failed: {}", connection.id, e);
                    report.failed += 1;
                }
            }
        }
        debug!(
            "Broadcast delivered to {} connection(s), {} failed",
            report.delivered, report.failed
        );
        report
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Critical sections only insert, remove or clone, so a poisoned map is still whole.
    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, Connection>> {
        self.connections.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
