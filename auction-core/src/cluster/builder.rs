use std::sync::Arc;

use auction_common::NodeId;

use crate::network::{in_memory::InMemoryTransport, retry::RetryPolicy};

use super::node::{FanOutMode, Node};

/// Builds a full-mesh cluster of in-process nodes sharing one [`InMemoryTransport`].
pub struct InMemoryClusterBuilder {
    nodes: usize,
    retry: RetryPolicy,
    fan_out: FanOutMode,
}

impl InMemoryClusterBuilder {
    pub fn new() -> Self {
        Self {
            nodes: 3,
            retry: RetryPolicy::default(),
            fan_out: FanOutMode::default(),
        }
    }

    pub fn with_nodes(mut self, nodes: usize) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_fan_out(mut self, fan_out: FanOutMode) -> Self {
        self.fan_out = fan_out;
        self
    }

    /// Nodes are named `node-1` .. `node-N`; each lists every other node as a peer.
    pub fn build(self) -> (InMemoryTransport, Vec<Arc<Node>>) {
        let transport = InMemoryTransport::new();
        let ids: Vec<NodeId> = (1..=self.nodes)
            .map(|i| NodeId(format!("node-{}", i)))
            .collect();

        let nodes: Vec<Arc<Node>> = ids
            .iter()
            .map(|id| {
                let peers = ids.iter().filter(|p| *p != id).cloned().collect();
                let node = Node::new(id.clone(), peers, Arc::new(transport.clone()))
                    .with_retry_policy(self.retry.clone())
                    .with_fan_out(self.fan_out);
                transport.register(id.clone(), node.replica());
                Arc::new(node)
            })
            .collect();

        (transport, nodes)
    }
}

impl Default for InMemoryClusterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
