//! Shared networking defaults and helpers used by client and server.

/// Host the server binds to and the client connects to by default.
pub const DEFAULT_HOST: &str = "localhost";
/// WebSocket port of the chat server.
pub const DEFAULT_PORT: u16 = 8765;

/// Helper to format a host and a port like "host:port".
pub fn addr(host: &str, port: u16) -> String {
    format!("{}:{}", host, port)
}

/// WebSocket URL for a plain-text connection to `host:port`.
pub fn ws_url(host: &str, port: u16) -> String {
    format!("ws://{}", addr(host, port))
}
