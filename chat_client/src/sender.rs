//! Reading user input for the chat client.
//!
//! Standard input is blocking, so it is read on a dedicated thread that forwards every
//! non-empty line to the async side over a channel. The channel closing tells the main
//! loop that input reached end of file.
use log::{debug, error, info};
use std::io::{self, BufRead};
use std::thread;
use tokio::sync::mpsc;

/// Spawn the stdin reader thread and return the receiving end of its lines.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        forward_lines(stdin.lock(), &tx);
        info!("Input closed");
    });
    rx
}

/// Forward trimmed, non-empty lines from `reader` until it ends or `tx` closes.
pub fn forward_lines<R: BufRead>(reader: R, tx: &mpsc::UnboundedSender<String>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read input: {}", e);
                return;
            }
        };
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }
        if tx.send(line.to_string()).is_err() {
            debug!("Input channel closed, reader stopping");
            return;
        }
    }
}
