//! In-band command grammar shared by client and server.
//!
//! Every inbound line is either a chat message or the `exchange` command:
//!
//! ```text
//! exchange <days> <currency1> [<currency2> ...]
//! ```
//!
//! `days` is a base-10 integer. Values above [`MAX_DAYS`] are capped rather than
//! rejected; zero, negative and non-numeric values make the line `Malformed`.
//! Currency codes are free-form tokens and are not validated here.
use std::num::IntErrorKind;

/// Keyword that introduces the rate lookup command.
pub const EXCHANGE_KEYWORD: &str = "exchange";
/// Upper bound for the number of days a single command may request.
pub const MAX_DAYS: u32 = 10;
/// Human readable form of the command, used in error replies and help output.
pub const USAGE: &str = "exchange <days> <currency...>";

/// A classified inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Rate lookup for `days` days (already capped) and at least one currency.
    Exchange {
        /// Number of days back from today, in `1..=MAX_DAYS`.
        days: u32,
        /// Currency codes in the order they were supplied.
        currencies: Vec<String>,
    },
    /// The line starts with the keyword but its arguments do not match [`USAGE`].
    Malformed,
    /// Anything else: a chat message to relay.
    ChatLine {
        /// The line exactly as received.
        text: String,
    },
}

impl Command {
    /// Classify a single line.
    pub fn parse(line: &str) -> Command {
        let Some(args) = strip_keyword(line) else {
            return Command::ChatLine {
                text: line.to_string(),
            };
        };

        let mut tokens = args.split_whitespace();
        let Some(days) = tokens.next().and_then(parse_days) else {
            return Command::Malformed;
        };
        let currencies: Vec<String> = tokens.map(str::to_string).collect();
        if currencies.is_empty() {
            return Command::Malformed;
        }
        Command::Exchange { days, currencies }
    }
}

/// Returns the argument part when `line` is the keyword alone or the keyword
/// followed by whitespace.
fn strip_keyword(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(EXCHANGE_KEYWORD)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest),
        Some(_) => None,
    }
}

fn parse_days(token: &str) -> Option<u32> {
    match token.parse::<u32>() {
        Ok(0) => None,
        Ok(days) => Some(days.min(MAX_DAYS)),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(MAX_DAYS),
        Err(_) => None,
    }
}
