use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use auction_common::{Bid, BidOutcome, EndStatus, Envelope, NodeId, Operation};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    network::{
        retry::{deliver_with_retry, DeliveryReport, RetryPolicy},
        traits::ReplicationTransport,
    },
    replica::{Applied, Replica},
    state::StateSnapshot,
};

/// How a node pushes one operation to its peers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanOutMode {
    /// One delivery per peer, all in flight together, joined before returning.
    #[default]
    Parallel,
    /// Peers in list order, one after another.
    Sequential,
}

impl FromStr for FanOutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "parallel" => Ok(FanOutMode::Parallel),
            "sequential" => Ok(FanOutMode::Sequential),
            other => Err(format!("unknown fan-out mode '{}' (parallel|sequential)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStats {
    pub deliveries_ok: u64,
    pub deliveries_failed: u64,
    pub duplicates_ignored: u64,
}

#[derive(Debug, Default)]
struct Counters {
    deliveries_ok: AtomicU64,
    deliveries_failed: AtomicU64,
}

/// A process-local auctioneer.
///
/// Client operations are decided against the local replica first; that answer is
/// what the caller gets. The same operation is then pushed to every peer, and
/// peer delivery results never change the answer.
pub struct Node {
    id: NodeId,
    replica: Arc<Replica>,
    peers: Vec<NodeId>,
    transport: Arc<dyn ReplicationTransport>,
    retry: RetryPolicy,
    fan_out: FanOutMode,
    counters: Counters,
}

impl Node {
    pub fn new(id: NodeId, peers: Vec<NodeId>, transport: Arc<dyn ReplicationTransport>) -> Self {
        Node {
            id,
            replica: Arc::new(Replica::new()),
            peers,
            transport,
            retry: RetryPolicy::default(),
            fan_out: FanOutMode::default(),
            counters: Counters::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_fan_out(mut self, fan_out: FanOutMode) -> Self {
        self.fan_out = fan_out;
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn peers(&self) -> &[NodeId] {
        &self.peers
    }

    /// Shared handle on the local replica, for registering with an in-process transport.
    pub fn replica(&self) -> Arc<Replica> {
        Arc::clone(&self.replica)
    }

    pub async fn bid(&self, bid: Bid) -> BidOutcome {
        let envelope = Envelope::new(self.id.clone(), Operation::Bid(bid.clone()));
        self.replica.mark_applied(envelope.id);

        let outcome = self.replica.state().bid(bid);
        debug!(node = %self.id, op = %envelope.id, %outcome, "local bid decided");

        self.replicate(&envelope).await;
        outcome
    }

    pub async fn end(&self) -> EndStatus {
        let envelope = Envelope::new(self.id.clone(), Operation::End);
        self.replica.mark_applied(envelope.id);

        let status = self.replica.state().end();
        debug!(node = %self.id, op = %envelope.id, %status, "local end decided");

        self.replicate(&envelope).await;
        status
    }

    /// Local read only; peers are never consulted.
    pub fn result(&self) -> Option<Bid> {
        self.replica.state().result()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.replica.state().snapshot()
    }

    /// Applies an operation that arrived from a peer. Never re-broadcast.
    pub fn apply_replicated(&self, envelope: &Envelope) -> Applied {
        let applied = self.replica.apply(envelope);
        debug!(
            node = %self.id,
            origin = %envelope.origin,
            op = %envelope.id,
            kind = envelope.operation.kind(),
            ?applied,
            "replicated operation applied"
        );
        applied
    }

    pub fn stats(&self) -> NodeStats {
        NodeStats {
            deliveries_ok: self.counters.deliveries_ok.load(Ordering::Relaxed),
            deliveries_failed: self.counters.deliveries_failed.load(Ordering::Relaxed),
            duplicates_ignored: self.replica.duplicates_ignored(),
        }
    }

    async fn replicate(&self, envelope: &Envelope) -> Vec<DeliveryReport> {
        let transport = self.transport.as_ref();

        let reports = match self.fan_out {
            FanOutMode::Parallel => {
                join_all(
                    self.peers
                        .iter()
                        .map(|peer| deliver_with_retry(transport, peer, envelope, &self.retry)),
                )
                .await
            }
            FanOutMode::Sequential => {
                let mut reports = Vec::with_capacity(self.peers.len());
                for peer in &self.peers {
                    reports.push(deliver_with_retry(transport, peer, envelope, &self.retry).await);
                }
                reports
            }
        };

        for report in &reports {
            match &report.result {
                Ok(()) => {
                    self.counters.deliveries_ok.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    self.counters.deliveries_failed.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        node = %self.id,
                        peer = %report.peer,
                        op = %envelope.id,
                        kind = envelope.operation.kind(),
                        attempts = report.attempts,
                        error = %e,
                        "replication to peer failed"
                    );
                }
            }
        }

        reports
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("peers", &self.peers)
            .field("fan_out", &self.fan_out)
            .field("retry", &self.retry)
            .finish()
    }
}
