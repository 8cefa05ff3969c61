//! Chat relay server library.
//!
//! Clients connect over WebSocket and every text frame is a line. Plain lines are
//! relayed to all other clients prefixed with the sender's display name; lines of the
//! form `exchange <days> <currency...>` fetch historical sale rates and are answered to
//! the sender only.
//!
//! - `registry` — live connections, display names and broadcast.
//! - `router` — the per-connection session loop and line dispatch.
//! - `rates` — upstream rate lookups and their concurrent aggregation.
//! - `reply` — text of command replies.
//! - `listener` — TCP/WebSocket accept loop and per-connection writer tasks.
//! - `keepalive` — ping schedule and idle timeout.
//! - `names` — random display names.
//! - `config` — command-line options.

pub mod config;
pub mod keepalive;
pub mod listener;
pub mod names;
pub mod rates;
pub mod registry;
pub mod reply;
pub mod router;
