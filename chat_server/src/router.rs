//! Per-connection session loop and line dispatch.
//!
//! A session moves through three states:
//!
//! - `Connecting` — the WebSocket handshake is done but the peer is not yet known to
//!   the registry.
//! - `Active` — registered under a display name; every inbound text frame is a line
//!   that is either relayed to the other clients or handled as an `exchange` command
//!   whose reply goes to the sender only.
//! - `Closed` — the peer sent Close, the stream ended or failed, or the peer went
//!   silent past the idle timeout.
//!
//! Leaving `Active` always unregisters the connection: the registration is owned by a
//! guard that unregisters on drop, so an early return, a transport error or an aborted
//! task all take the same path.
//!
//! `exchange` lookups run inside the session loop next to the inbound reader, so frames
//! keep refreshing the idle timer while rates are fetched. Replies go out in command
//! order. Lookups still pending when the session ends are dropped unanswered.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use chat_common::{ChatError, Command};
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesOrdered;
use futures_util::{FutureExt, Stream, StreamExt};
use log::{debug, info, warn};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;

use crate::keepalive::{Keepalive, SessionSettings};
use crate::rates::RateAggregator;
use crate::registry::{Connection, ConnectionRegistry, Outbox};
use crate::reply;

/// Reply to an `exchange` command that is still being looked up.
pub type PendingReply<'a> = BoxFuture<'a, ()>;

/// Unregisters its connection when dropped.
struct Registration<'a> {
    registry: &'a ConnectionRegistry,
    connection: Connection,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.registry.unregister(self.connection.id());
    }
}

/// Routes inbound lines of every session to the registry or the rate aggregator.
pub struct MessageRouter {
    registry: Arc<ConnectionRegistry>,
    aggregator: RateAggregator,
    settings: SessionSettings,
}

impl MessageRouter {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        aggregator: RateAggregator,
        settings: SessionSettings,
    ) -> Self {
        Self {
            registry,
            aggregator,
            settings,
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Run one session until the peer goes away.
    ///
    /// `inbound` yields the frames read from the peer; everything addressed to the
    /// peer is queued on `outbox`.
    pub async fn run_session<S, E>(&self, peer: SocketAddr, mut inbound: S, outbox: Outbox)
    where
        S: Stream<Item = Result<Message, E>> + Unpin,
        E: fmt::Display,
    {
        let registration = Registration {
            registry: &self.registry,
            connection: self.registry.register(peer, outbox),
        };
        let connection = &registration.connection;

        let mut keepalive = Keepalive::new(Instant::now(), self.settings.idle_timeout);
        let period = self.settings.ping_interval;
        let mut ping = time::interval_at(Instant::now() + period, period);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut replies: FuturesOrdered<PendingReply<'_>> = FuturesOrdered::new();

        loop {
            let pending = tokio::select! {
                frame = inbound.next() => {
                    let message = match frame {
                        Some(Ok(message)) => message,
                        Some(Err(e)) => {
                            warn!("Receive error from {}: {}", connection.display_name(), e);
                            break;
                        }
                        None => {
                            debug!("Stream of {} ended", connection.display_name());
                            break;
                        }
                    };
                    keepalive.touch(Instant::now());

                    match message {
                        Message::Text(text) => self.route(connection, text.as_str()),
                        Message::Binary(data) => match String::from_utf8(data.to_vec()) {
                            Ok(text) => self.route(connection, &text),
                            Err(e) => {
                                debug!(
                                    "Ignoring binary frame from {}: {}",
                                    connection.display_name(),
                                    ChatError::from(e)
                                );
                                None
                            }
                        },
                        Message::Close(frame) => {
                            info!("{} closed the connection: {:?}", connection.display_name(), frame);
                            break;
                        }
                        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => None,
                    }
                }
                Some(()) = replies.next(), if !replies.is_empty() => None,
                _ = ping.tick() => {
                    let now = Instant::now();
                    if keepalive.is_expired(now) {
                        warn!(
                            "{} silent for {:?}, closing",
                            connection.display_name(),
                            keepalive.silence(now)
                        );
                        let _ = connection.send(Message::Close(None));
                        break;
                    }
                    if connection.send(Message::Ping(Vec::new().into())).is_err() {
                        break;
                    }
                    None
                }
            };
            if let Some(reply) = pending {
                replies.push_back(reply);
            }
        }

        if !replies.is_empty() {
            info!(
                "{} left with {} exchange command(s) unanswered",
                connection.display_name(),
                replies.len()
            );
        }
    }

    /// Handle one inbound line of `connection`.
    ///
    /// Chat lines and malformed commands are answered before this returns. An
    /// `exchange` command yields the future that fetches the rates and sends the reply.
    pub fn route(&self, connection: &Connection, line: &str) -> Option<PendingReply<'_>> {
        match Command::parse(line) {
            Command::ChatLine { text } => {
                let message = format!("{}: {}", connection.display_name(), text);
                self.registry.broadcast(&message, Some(connection.id()));
                None
            }
            Command::Malformed => {
                debug!("Malformed command from {}: {:?}", connection.display_name(), line);
                send_reply(connection, reply::format_error());
                None
            }
            Command::Exchange { days, currencies } => {
                info!(
                    "{} ({}) requests {} day(s) of rates for {}",
                    connection.display_name(),
                    connection.peer(),
                    days,
                    currencies.join(",")
                );
                let aggregator = &self.aggregator;
                let connection = connection.clone();
                Some(
                    async move {
                        let result = aggregator.aggregate(&currencies, days).await;
                        let failed = result.failures();
                        if failed > 0 {
                            warn!(
                                "{} of the rates requested by {} could not be fetched",
                                failed,
                                connection.display_name()
                            );
                        }
                        send_reply(&connection, reply::exchange_summary(&result));
                    }
                    .boxed(),
                )
            }
        }
    }
}

fn send_reply(connection: &Connection, text: String) {
    if let Err(e) = connection.send_text(text) {
        warn!("Reply to {} dropped: {}", connection.display_name(), e);
    }
}
