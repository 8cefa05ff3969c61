//! Command-line configuration of the chat server.
//!
//! Every option has a default so the server starts with no arguments; the network
//! and upstream options can also be set through `CHAT_*` environment variables.

use std::time::Duration;

use chat_common::net::{self, DEFAULT_HOST, DEFAULT_PORT};
use clap::Parser;
use clap::builder::TypedValueParser;

use crate::keepalive::SessionSettings;
use crate::rates::aggregator::DEFAULT_MAX_IN_FLIGHT;
use crate::rates::privatbank::DEFAULT_BASE_URL;

/// Chat relay with an in-band exchange-rate command.
#[derive(Debug, Clone, Parser)]
#[command(name = "chat_server", version, about, long_about = None)]
pub struct Config {
    /// Host or IP address to listen on.
    #[arg(long, env = "CHAT_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// WebSocket port.
    #[arg(long, env = "CHAT_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Base URL of the exchange-rate archive API.
    #[arg(long, env = "CHAT_RATES_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Upper bound for concurrent requests to the rate API across all clients.
    #[arg(
        long,
        env = "CHAT_MAX_IN_FLIGHT",
        default_value_t = DEFAULT_MAX_IN_FLIGHT,
        value_parser = clap::value_parser!(u16).range(1..).map(usize::from)
    )]
    pub max_in_flight: usize,

    /// Timeout of a single rate API request, in seconds.
    #[arg(long, default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Interval between keep-alive pings sent to clients, in seconds.
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u64).range(1..))]
    pub ping_interval_secs: u64,

    /// Close a client after this many seconds without any inbound frame.
    #[arg(long, default_value_t = 60)]
    pub idle_timeout_secs: u64,
}

impl Config {
    /// Address to bind, as `host:port`.
    pub fn bind_addr(&self) -> String {
        net::addr(&self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            ping_interval: Duration::from_secs(self.ping_interval_secs),
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
        }
    }
}
