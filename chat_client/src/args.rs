//! Command-line arguments for the chat client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::time::Duration;

use chat_common::net::{DEFAULT_HOST, DEFAULT_PORT, ws_url};
use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// WebSocket URL of the chat server.
    #[clap(long, env = "CHAT_URL", default_value_t = ws_url(DEFAULT_HOST, DEFAULT_PORT))]
    pub url: String,

    /// Seconds between keep-alive pings sent to the server.
    #[clap(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub ping_interval_secs: u64,
}

impl Args {
    /// Keep-alive interval as a `Duration`.
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_server() {
        let args = Args::try_parse_from(["chat_client"]).unwrap();
        assert_eq!(args.url, "ws://localhost:8765");
        assert_eq!(args.ping_interval(), Duration::from_secs(5));
    }
}
