//!
//! Common types and utilities shared by the chat server and client.
//!
//! This crate aggregates:
//! - `error` — unified error type `ChatError` used across the workspace.
//! - `result` — handy `Result<T, ChatError>` alias.
//! - `command` — the in-band line grammar (`exchange <days> <currency...>` vs chat).
//! - `net` — networking defaults and small helpers.
#![warn(missing_docs)]
pub mod command;
pub mod error;
pub mod net;
pub mod result;

pub use command::Command;
pub use error::ChatError;
pub use result::Result;
