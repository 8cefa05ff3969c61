//! Keep-alive state for a single WebSocket session.
//!
//! The server pings every session on a fixed schedule and records the last time
//! anything was heard from the peer. A session that stays silent for longer than
//! the idle timeout is closed by the router.
//!
//! Design notes:
//! - Time is measured with `tokio::time::Instant`: monotonic, immune to system clock
//!   changes, and frozen together with the runtime clock in paused-time tests.
//! - The tracker is owned by the session task, so it needs no synchronization.
//! - Expiry is strict: a peer seen exactly `idle_timeout` ago is still alive.

use std::time::Duration;

use tokio::time::Instant;

/// Default interval between server pings.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(20);
/// Default silence after which a session is closed.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Per-session timing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// How often the server sends a Ping frame.
    pub ping_interval: Duration,
    /// Silence after which the session is closed.
    pub idle_timeout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ping_interval: DEFAULT_PING_INTERVAL,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

/// Tracks when the peer was last heard from.
#[derive(Debug)]
pub struct Keepalive {
    last_seen: Instant,
    idle_timeout: Duration,
}

impl Keepalive {
    /// Create a tracker that considers the peer seen at `now`.
    pub fn new(now: Instant, idle_timeout: Duration) -> Self {
        Self {
            last_seen: now,
            idle_timeout,
        }
    }

    /// Record inbound activity.
    pub fn touch(&mut self, now: Instant) {
        self.last_seen = now;
    }

    /// Check whether the peer has been silent for longer than the idle timeout.
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_seen) > self.idle_timeout
    }

    /// Time since the last inbound activity.
    pub fn silence(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_seen)
    }
}
