use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use auction_common::{Bid, BidOutcome, EndStatus};
use thiserror::Error;
use tracing::warn;

use crate::network::error::TransportError;

use super::{endpoint::AuctionEndpoint, selector::NodeSelector};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClusterError {
    #[error("No auctioneer nodes available")]
    NoLiveNodes,

    #[error("Node {node} failed: {source}")]
    Endpoint {
        node: String,
        #[source]
        source: TransportError,
    },
}

struct Member<E> {
    endpoint: Arc<E>,
    alive: AtomicBool,
}

/// Client-side front-end over a set of nodes.
///
/// Each operation goes to one live member chosen by the selection policy. A member
/// that fails at the transport level is marked down and skipped afterwards.
pub struct Cluster<E> {
    members: Vec<Member<E>>,
    selector: Box<dyn NodeSelector>,
}

impl<E: AuctionEndpoint> Cluster<E> {
    pub fn new(selector: Box<dyn NodeSelector>) -> Self {
        Cluster { members: Vec::new(), selector }
    }

    pub fn add(&mut self, endpoint: Arc<E>) {
        self.members.push(Member {
            endpoint,
            alive: AtomicBool::new(true),
        });
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.members.iter().filter(|m| m.alive.load(Ordering::Relaxed)).count()
    }

    pub fn mark_down(&self, name: &str) -> bool {
        self.set_alive(name, false)
    }

    pub fn mark_up(&self, name: &str) -> bool {
        self.set_alive(name, true)
    }

    pub fn pick(&self) -> Option<Arc<E>> {
        let live: Vec<&Member<E>> = self
            .members
            .iter()
            .filter(|m| m.alive.load(Ordering::Relaxed))
            .collect();
        let index = self.selector.select(live.len())?;
        live.get(index).map(|m| Arc::clone(&m.endpoint))
    }

    pub async fn bid(&self, bid: Bid) -> Result<BidOutcome, ClusterError> {
        let node = self.pick().ok_or(ClusterError::NoLiveNodes)?;
        let result = node.bid(bid).await;
        self.observe(node.as_ref(), result)
    }

    pub async fn result(&self) -> Result<Option<Bid>, ClusterError> {
        let node = self.pick().ok_or(ClusterError::NoLiveNodes)?;
        let result = node.result().await;
        self.observe(node.as_ref(), result)
    }

    pub async fn end(&self) -> Result<EndStatus, ClusterError> {
        let node = self.pick().ok_or(ClusterError::NoLiveNodes)?;
        let result = node.end().await;
        self.observe(node.as_ref(), result)
    }

    fn observe<T>(&self, node: &E, result: Result<T, TransportError>) -> Result<T, ClusterError> {
        result.map_err(|source| {
            let name = node.name();
            warn!(node = %name, error = %source, "marking node down");
            self.mark_down(&name);
            ClusterError::Endpoint { node: name, source }
        })
    }

    fn set_alive(&self, name: &str, alive: bool) -> bool {
        match self.members.iter().find(|m| m.endpoint.name() == name) {
            Some(member) => {
                member.alive.store(alive, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::selector::RoundRobinSelector;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct FakeEndpoint {
        name: String,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeEndpoint {
        fn new(name: &str, fail: bool) -> Arc<Self> {
            Arc::new(FakeEndpoint { name: name.into(), fail, calls: AtomicUsize::new(0) })
        }

        fn respond<T>(&self, value: T) -> Result<T, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(TransportError::PeerUnreachable(self.name.clone()))
            } else {
                Ok(value)
            }
        }
    }

    #[async_trait]
    impl AuctionEndpoint for FakeEndpoint {
        fn name(&self) -> String {
            self.name.clone()
        }
        async fn bid(&self, _bid: Bid) -> Result<BidOutcome, TransportError> {
            self.respond(BidOutcome::Accepted)
        }
        async fn result(&self) -> Result<Option<Bid>, TransportError> {
            self.respond(None)
        }
        async fn end(&self) -> Result<EndStatus, TransportError> {
            self.respond(EndStatus::Ended)
        }
    }

    fn round_robin() -> Box<dyn NodeSelector> {
        Box::new(RoundRobinSelector::default())
    }

    #[tokio::test]
    async fn test_empty_cluster_reports_no_live_nodes() {
        let cluster: Cluster<FakeEndpoint> = Cluster::new(round_robin());
        assert_eq!(cluster.result().await, Err(ClusterError::NoLiveNodes));
    }

    #[tokio::test]
    async fn test_marked_down_nodes_are_skipped() {
        let a = FakeEndpoint::new("a", false);
        let b = FakeEndpoint::new("b", false);
        let mut cluster = Cluster::new(round_robin());
        cluster.add(Arc::clone(&a));
        cluster.add(Arc::clone(&b));

        assert!(cluster.mark_down("a"));
        for _ in 0..4 {
            cluster.result().await.unwrap();
        }
        assert_eq!(a.calls.load(Ordering::SeqCst), 0);
        assert_eq!(b.calls.load(Ordering::SeqCst), 4);

        cluster.mark_down("b");
        assert_eq!(cluster.end().await, Err(ClusterError::NoLiveNodes));

        cluster.mark_up("a");
        assert_eq!(cluster.end().await, Ok(EndStatus::Ended));
    }

    #[tokio::test]
    async fn test_failing_node_is_marked_down() {
        let bad = FakeEndpoint::new("bad", true);
        let good = FakeEndpoint::new("good", false);
        let mut cluster = Cluster::new(round_robin());
        cluster.add(Arc::clone(&bad));
        cluster.add(Arc::clone(&good));

        let first = cluster.bid(Bid::new("x", 1).unwrap()).await;
        assert!(matches!(first, Err(ClusterError::Endpoint { ref node, .. }) if node == "bad"));
        assert_eq!(cluster.live_count(), 1);

        for _ in 0..3 {
            assert_eq!(cluster.bid(Bid::new("x", 1).unwrap()).await, Ok(BidOutcome::Accepted));
        }
        assert_eq!(bad.calls.load(Ordering::SeqCst), 1);
    }
}
