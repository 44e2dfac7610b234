//! Line-oriented bidder session shared by `auction-client` and `auction-sim`.

use std::str::FromStr;

use auction_common::{Bid, BidOutcome};
use auction_core::{AuctionEndpoint, Cluster, ClusterError};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const HELP: &str = "Commands: login <name>, bid <amount>, result, end, help, exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(String),
    Bid(i64),
    Result,
    End,
    Help,
    Exit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown command: {0}. Type 'help' for the list.")]
    Unknown(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "login" => {
                let mut words = rest.split_whitespace();
                match (words.next(), words.next()) {
                    (Some(name), None) => Ok(Command::Login(name.to_string())),
                    _ => Err(CommandError::Usage("login <name>")),
                }
            }
            "bid" if rest.is_empty() => Err(CommandError::Usage("bid <amount>")),
            "bid" => rest
                .parse::<i64>()
                .map(Command::Bid)
                .map_err(|_| CommandError::InvalidAmount(rest.to_string())),
            "result" => Ok(Command::Result),
            "end" => Ok(Command::End),
            "help" => Ok(Command::Help),
            "exit" | "quit" => Ok(Command::Exit),
            _ => Err(CommandError::Unknown(word.to_string())),
        }
    }
}

/// What the session printed for one input line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub exit: bool,
}

impl Reply {
    fn line(text: impl Into<String>) -> Self {
        Reply { lines: vec![text.into()], exit: false }
    }
}

/// One bidder talking to a cluster. Each command goes to whichever node the
/// cluster's selection policy picks.
pub struct Session<E> {
    cluster: Cluster<E>,
    bidder: Option<String>,
}

impl<E: AuctionEndpoint> Session<E> {
    pub fn new(cluster: Cluster<E>) -> Self {
        Session { cluster, bidder: None }
    }

    pub fn bidder(&self) -> Option<&str> {
        self.bidder.as_deref()
    }

    pub fn cluster(&self) -> &Cluster<E> {
        &self.cluster
    }

    pub async fn handle_line(&mut self, line: &str) -> Reply {
        if line.trim().is_empty() {
            return Reply::default();
        }
        match line.parse::<Command>() {
            Ok(command) => self.execute(command).await,
            Err(e) => Reply::line(e.to_string()),
        }
    }

    pub async fn execute(&mut self, command: Command) -> Reply {
        match command {
            Command::Login(name) => {
                let reply = Reply::line(format!("Logged in as: {}", name));
                self.bidder = Some(name);
                reply
            }
            Command::Bid(amount) => {
                let Some(bidder) = self.bidder.as_deref() else {
                    return Reply::line("You must login first.");
                };
                let bid = match Bid::new(bidder, amount) {
                    Ok(bid) => bid,
                    Err(e) => return Reply::line(format!("Error: {}", e)),
                };
                match self.cluster.bid(bid).await {
                    Ok(outcome) => Reply::line(describe_outcome(outcome)),
                    Err(e) => Reply::line(describe_error(&e)),
                }
            }
            Command::Result => Reply::line(self.result_line().await),
            Command::End => match self.cluster.end().await {
                Ok(status) => Reply {
                    lines: vec![format!("Auction status: {}", status), self.result_line().await],
                    exit: false,
                },
                Err(e) => Reply::line(describe_error(&e)),
            },
            Command::Help => Reply::line(HELP),
            Command::Exit => Reply { lines: vec!["Bye.".into()], exit: true },
        }
    }

    async fn result_line(&self) -> String {
        match self.cluster.result().await {
            Ok(Some(bid)) => format!("Highest bid: {}", bid),
            Ok(None) => "No bids yet.".to_string(),
            Err(e) => describe_error(&e),
        }
    }
}

fn describe_outcome(outcome: BidOutcome) -> String {
    match outcome.rejection() {
        None => format!("Bid outcome: {}", outcome.as_wire()),
        Some(reason) => format!("Bid outcome: {} ({})", outcome.as_wire(), reason.as_str()),
    }
}

fn describe_error(err: &ClusterError) -> String {
    format!("Error: {}", err)
}

/// Reads commands until EOF or `exit`, writing replies and a prompt to `output`.
pub async fn run<E, R, W>(session: &mut Session<E>, input: R, mut output: W) -> std::io::Result<()>
where
    E: AuctionEndpoint,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(format!("{}\n> ", HELP).as_bytes()).await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let reply = session.handle_line(&line).await;
        for text in &reply.lines {
            output.write_all(text.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }
        if reply.exit {
            break;
        }
        output.write_all(b"> ").await?;
        output.flush().await?;
    }

    output.flush().await
}
