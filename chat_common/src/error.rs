//! Error types shared between client and server.
//!
//! The `ChatError` enum unifies common failure cases for I/O, the WebSocket
//! transport, text decoding, timeouts and channel communication, allowing crates to
//! propagate a single error type.
use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Unified error type shared by client and server.
#[derive(Error, Debug)]
pub enum ChatError {
    /// I/O error originating from the standard library or sockets.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// UTF-8 conversion error when handling frame payloads.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// WebSocket protocol or handshake failure.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// Channel send failed (receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// An operation did not complete within its deadline.
    #[error("Timed out: {0}")]
    Timeout(String),
}
