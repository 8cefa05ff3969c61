//! Chat Client — an interactive WebSocket client for the chat relay server.
//!
//! Lines typed on stdin are sent to the server; everything the server sends (chat
//! lines of other users and replies to `exchange` commands) is printed to stdout. A
//! keep-alive ping is sent periodically so the server does not close an idle session.
//!
//! Usage example (CLI):
//! ```bash
//! chat_client --url ws://192.168.0.10:8765
//! ```
//!
//! Type `exchange <days> <currency...>` (e.g. `exchange 3 USD EUR`) to request rates.
#![warn(missing_docs)]
mod args;
mod sender;

use crate::args::Args;
use chat_common::command::USAGE;
use chat_common::{ChatError, Result};
use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[tokio::main]
async fn main() -> Result<(), ChatError> {
    init_logger();
    let args = Args::parse();

    info!("Connecting to {}", args.url);
    let (ws, _) = connect_async(args.url.as_str()).await?;
    let (mut sink, mut stream) = ws.split();
    info!("Connected. Type a message, or '{}'. Press Ctrl+C to exit.", USAGE);

    let mut input = sender::spawn_stdin_reader();
    let period = args.ping_interval();
    let mut ping = time::interval_at(Instant::now() + period, period);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            line = input.recv() => match line {
                Some(line) => sink.send(Message::text(line)).await?,
                None => {
                    info!("End of input, disconnecting");
                    break;
                }
            },
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => println!("{}", text.as_str()),
                Some(Ok(Message::Close(frame))) => {
                    info!("Server closed the connection: {:?}", frame);
                    return Ok(());
                }
                Some(Ok(other)) => debug!("Ignoring frame: {:?}", other),
                Some(Err(e)) => return Err(e.into()),
                None => {
                    warn!("Connection closed by server");
                    return Ok(());
                }
            },
            _ = ping.tick() => sink.send(Message::Ping(Vec::new().into())).await?,
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received. Shutting down client...");
                break;
            }
        }
    }

    sink.send(Message::Close(None)).await?;
    let _ = sink.close().await;
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
