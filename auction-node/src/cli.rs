use std::path::PathBuf;

use auction_core::{FanOutMode, SelectionPolicy};
use clap::Parser;

/// Serve one auctioneer node over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "auction-node")]
#[command(about = "Replicated auctioneer node")]
pub struct NodeArgs {
    /// Port to listen on (required unless --config provides it)
    pub port: Option<u16>,

    /// Base URLs of peer nodes, e.g. http://localhost:8001
    #[arg(value_name = "PEER_URL")]
    pub peers: Vec<String>,

    /// Node identifier; defaults to node-<port>
    #[arg(long)]
    pub id: Option<String>,

    /// Interface to bind
    #[arg(long)]
    pub address: Option<String>,

    /// JSON config file; command-line values override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// parallel | sequential
    #[arg(long)]
    pub fan_out: Option<FanOutMode>,

    /// Delivery attempts per peer
    #[arg(long)]
    pub retries: Option<u32>,

    /// Timeout of a single delivery attempt
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

/// Interactive client against one or more HTTP nodes.
#[derive(Parser, Debug, Clone)]
#[command(name = "auction-client")]
#[command(about = "Auction REPL over HTTP nodes")]
pub struct ClientArgs {
    /// Node base URLs, e.g. http://localhost:8000
    #[arg(value_name = "NODE_URL", required = true)]
    pub nodes: Vec<String>,

    /// random | round-robin
    #[arg(long, default_value = "random")]
    pub policy: SelectionPolicy,

    /// Per-request timeout
    #[arg(long, default_value_t = 5_000)]
    pub timeout_ms: u64,
}

/// Interactive auction against an in-process cluster.
#[derive(Parser, Debug, Clone)]
#[command(name = "auction-sim")]
#[command(about = "Auction REPL over a simulated in-process cluster")]
pub struct SimArgs {
    /// Number of auctioneer nodes (full mesh)
    #[arg(long, default_value_t = 3)]
    pub nodes: usize,

    /// random | round-robin
    #[arg(long, default_value = "random")]
    pub policy: SelectionPolicy,

    /// parallel | sequential
    #[arg(long, default_value = "parallel")]
    pub fan_out: FanOutMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_args_port_then_peers() {
        let args = NodeArgs::parse_from([
            "auction-node",
            "8000",
            "http://localhost:8001",
            "http://localhost:8002",
            "--fan-out",
            "sequential",
        ]);
        assert_eq!(args.port, Some(8000));
        assert_eq!(args.peers.len(), 2);
        assert_eq!(args.fan_out, Some(FanOutMode::Sequential));
    }

    #[test]
    fn test_client_requires_a_node() {
        assert!(ClientArgs::try_parse_from(["auction-client"]).is_err());

        let args = ClientArgs::try_parse_from([
            "auction-client",
            "http://localhost:8000",
            "--policy",
            "round-robin",
        ])
        .unwrap();
        assert_eq!(args.policy, SelectionPolicy::RoundRobin);
    }

    #[test]
    fn test_sim_defaults() {
        let args = SimArgs::parse_from(["auction-sim"]);
        assert_eq!(args.nodes, 3);
        assert_eq!(args.policy, SelectionPolicy::Random);
        assert_eq!(args.fan_out, FanOutMode::Parallel);
    }
}
