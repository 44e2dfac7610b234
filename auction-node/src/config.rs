use std::{
    fs,
    net::{IpAddr, SocketAddr},
    path::Path,
    sync::Arc,
    time::Duration,
};

use auction_common::NodeId;
use auction_core::{FanOutMode, HttpTransport, Node, RetryPolicy};
use serde::{Deserialize, Serialize};

use crate::{cli::NodeArgs, error::NodeError};

fn default_address() -> String {
    "0.0.0.0".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicationConfig {
    #[serde(default)]
    pub fan_out: FanOutMode,
    #[serde(default)]
    pub retry: RetryPolicy,
}

/// Everything one HTTP node needs to start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub node_id: NodeId,
    #[serde(default = "default_address")]
    pub address: String,
    pub port: u16,
    /// Peer base URLs. Also used as the peers' node ids.
    #[serde(default)]
    pub peers: Vec<String>,
    #[serde(default)]
    pub replication: ReplicationConfig,
}

impl Config {
    pub fn new(port: u16) -> Self {
        Config {
            node_id: NodeId(format!("node-{}", port)),
            address: default_address(),
            port,
            peers: Vec::new(),
            replication: ReplicationConfig::default(),
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), NodeError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, NodeError> {
        let json = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Builds the effective config: file first (if any), then command-line overrides.
    pub fn from_args(args: &NodeArgs) -> Result<Self, NodeError> {
        let mut config = match (&args.config, args.port) {
            (Some(path), _) => Config::load_from_file(path)?,
            (None, Some(port)) => Config::new(port),
            (None, None) => {
                return Err(NodeError::Config(
                    "a port is required when no --config file is given".into(),
                ))
            }
        };

        if let Some(port) = args.port {
            config.port = port;
        }
        if !args.peers.is_empty() {
            config.peers = args.peers.clone();
        }
        if let Some(id) = &args.id {
            config.node_id = NodeId(id.clone());
        }
        if let Some(address) = &args.address {
            config.address = address.clone();
        }
        if let Some(fan_out) = args.fan_out {
            config.replication.fan_out = fan_out;
        }
        if let Some(retries) = args.retries {
            config.replication.retry.max_attempts = retries;
        }
        if let Some(timeout_ms) = args.timeout_ms {
            config.replication.retry.attempt_timeout_ms = timeout_ms;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        if self.node_id.as_str().trim().is_empty() {
            return Err(NodeError::Config("node_id must not be empty".into()));
        }
        if self.replication.retry.max_attempts == 0 {
            return Err(NodeError::Config("retry.max_attempts must be at least 1".into()));
        }
        if self.replication.retry.attempt_timeout_ms == 0 {
            return Err(NodeError::Config("retry.attempt_timeout_ms must be positive".into()));
        }
        if self.address.parse::<IpAddr>().is_err() {
            return Err(NodeError::Config(format!(
                "address '{}' must be an IP address such as 0.0.0.0 or 127.0.0.1",
                self.address
            )));
        }
        for peer in &self.peers {
            if !(peer.starts_with("http://") || peer.starts_with("https://")) {
                return Err(NodeError::Config(format!(
                    "peer '{}' must be an http:// or https:// URL",
                    peer
                )));
            }
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, NodeError> {
        let ip: IpAddr = self.address.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn peer_ids(&self) -> Vec<NodeId> {
        self.peers.iter().map(|p| NodeId(p.clone())).collect()
    }

    /// Node wired to its peers over HTTP.
    pub fn build_node(&self) -> Result<Node, NodeError> {
        let retry = self.replication.retry.clone();
        let transport = HttpTransport::new(Duration::from_millis(retry.attempt_timeout_ms))?;

        Ok(Node::new(self.node_id.clone(), self.peer_ids(), Arc::new(transport))
            .with_retry_policy(retry)
            .with_fan_out(self.replication.fan_out))
    }
}
