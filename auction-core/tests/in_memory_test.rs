use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use auction_common::{Bid, BidOutcome, EndStatus, Envelope, NodeId, Rejection};
use auction_core::{
    Cluster, FanOutMode, InMemoryClusterBuilder, InMemoryTransport, Node, ReplicationTransport,
    RetryPolicy, RoundRobinSelector, TransportError,
};

fn bid(bidder: &str, amount: i64) -> Bid {
    Bid::new(bidder, amount).unwrap()
}

fn quick_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        attempt_timeout_ms: 200,
        backoff_base_ms: 1,
        backoff_max_ms: 5,
    }
}

fn assert_converged(nodes: &[Arc<Node>]) {
    let first = nodes[0].snapshot();
    for node in nodes {
        assert_eq!(node.snapshot(), first, "node {} diverged", node.id());
    }
}

#[tokio::test]
async fn test_bid_converges_on_every_node() {
    let (_transport, nodes) = InMemoryClusterBuilder::new().with_nodes(3).build();

    assert_eq!(nodes[0].bid(bid("alice", 100)).await, BidOutcome::Accepted);

    for node in &nodes {
        assert_eq!(node.result(), Some(bid("alice", 100)));
    }
    assert_converged(&nodes);
}

#[tokio::test]
async fn test_scenario_across_entry_points() {
    let (_transport, nodes) = InMemoryClusterBuilder::new()
        .with_nodes(3)
        .with_fan_out(FanOutMode::Sequential)
        .build();

    assert_eq!(nodes[0].bid(bid("A", 100)).await, BidOutcome::Accepted);
    assert_eq!(
        nodes[1].bid(bid("B", 90)).await,
        BidOutcome::Rejected(Rejection::BidTooLow)
    );
    assert_eq!(nodes[2].bid(bid("B", 150)).await, BidOutcome::Accepted);

    for node in &nodes {
        assert_eq!(node.result(), Some(bid("B", 150)));
    }
}

#[tokio::test]
async fn test_end_propagates_and_blocks_later_bids() {
    let (_transport, nodes) = InMemoryClusterBuilder::new().with_nodes(3).build();
    nodes[0].bid(bid("alice", 10)).await;

    assert_eq!(nodes[1].end().await, EndStatus::Ended);
    assert_eq!(nodes[2].end().await, EndStatus::AlreadyEnded);
    assert_eq!(nodes[0].end().await, EndStatus::AlreadyEnded);

    for node in &nodes {
        assert_eq!(
            node.bid(bid("bob", 1_000)).await,
            BidOutcome::Rejected(Rejection::AuctionEnded)
        );
        assert!(node.snapshot().ended);
    }
    assert_converged(&nodes);
    assert_eq!(nodes[0].result(), Some(bid("alice", 10)));
}

#[tokio::test]
async fn test_concurrent_bids_from_all_entry_points_converge_to_max() {
    let (_transport, nodes) = InMemoryClusterBuilder::new().with_nodes(4).build();

    let mut handles = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        let node = Arc::clone(node);
        handles.push(tokio::spawn(async move {
            for round in 0..50i64 {
                let amount = round * 10 + i as i64;
                node.bid(Bid::new(format!("bidder-{}", i), amount).unwrap()).await;
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    assert_converged(&nodes);
    assert_eq!(nodes[0].result(), Some(bid("bidder-3", 49 * 10 + 3)));
}

#[tokio::test]
async fn test_peer_failure_does_not_change_client_outcome() {
    let (transport, nodes) = InMemoryClusterBuilder::new()
        .with_nodes(3)
        .with_retry_policy(quick_retry())
        .build();

    transport.disconnect(nodes[2].id());

    assert_eq!(nodes[0].bid(bid("alice", 100)).await, BidOutcome::Accepted);
    assert_eq!(nodes[0].end().await, EndStatus::Ended);

    assert_eq!(nodes[1].result(), Some(bid("alice", 100)));
    assert_eq!(nodes[2].result(), None);
    assert!(!nodes[2].snapshot().ended);

    let stats = nodes[0].stats();
    assert_eq!(stats.deliveries_ok, 2);
    assert_eq!(stats.deliveries_failed, 2);
}

#[tokio::test]
async fn test_every_peer_unreachable_still_answers_locally() {
    let (transport, nodes) = InMemoryClusterBuilder::new()
        .with_nodes(3)
        .with_retry_policy(RetryPolicy::no_retry(std::time::Duration::from_millis(50)))
        .build();
    transport.disconnect(nodes[1].id());
    transport.disconnect(nodes[2].id());

    assert_eq!(nodes[0].bid(bid("alice", 5)).await, BidOutcome::Accepted);
    assert_eq!(nodes[0].result(), Some(bid("alice", 5)));
    assert_eq!(nodes[0].stats().deliveries_failed, 2);
}

/// Applies the envelope, then reports failure the first time, as if the ack was lost.
struct LostAckTransport {
    inner: InMemoryTransport,
    lost: AtomicU32,
}

#[async_trait]
impl ReplicationTransport for LostAckTransport {
    async fn deliver(&self, peer: &NodeId, envelope: &Envelope) -> Result<(), TransportError> {
        self.inner.deliver(peer, envelope).await?;
        if self.lost.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(TransportError::PeerUnreachable(peer.to_string()));
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_retried_delivery_is_applied_once() {
    let registry = InMemoryTransport::new();
    let transport = Arc::new(LostAckTransport { inner: registry.clone(), lost: AtomicU32::new(0) });

    let a = Node::new(NodeId::from("a"), vec![NodeId::from("b")], transport)
        .with_retry_policy(quick_retry());
    let b = Node::new(NodeId::from("b"), vec![], Arc::new(registry.clone()));
    registry.register(b.id().clone(), b.replica());

    assert_eq!(a.end().await, EndStatus::Ended);

    assert!(b.snapshot().ended);
    assert_eq!(b.stats().duplicates_ignored, 1);
    assert_eq!(a.stats().deliveries_ok, 1);
    assert_eq!(a.stats().deliveries_failed, 0);
}

#[tokio::test]
async fn test_asymmetric_peers_only_reach_listed_nodes() {
    let transport = InMemoryTransport::new();
    let ids: Vec<NodeId> = ["a", "b", "c"].into_iter().map(NodeId::from).collect();

    // a -> b -> c, no way back.
    let a = Arc::new(Node::new(ids[0].clone(), vec![ids[1].clone()], Arc::new(transport.clone())));
    let b = Arc::new(Node::new(ids[1].clone(), vec![ids[2].clone()], Arc::new(transport.clone())));
    let c = Arc::new(Node::new(ids[2].clone(), vec![], Arc::new(transport.clone())));
    for node in [&a, &b, &c] {
        transport.register(node.id().clone(), node.replica());
    }

    a.bid(bid("alice", 10)).await;
    assert_eq!(b.result(), Some(bid("alice", 10)));
    // Replicated ops are not forwarded.
    assert_eq!(c.result(), None);

    c.bid(bid("carol", 20)).await;
    assert_eq!(a.result(), Some(bid("alice", 10)));
    assert_eq!(b.result(), Some(bid("alice", 10)));
}

#[tokio::test]
async fn test_front_end_routes_over_in_process_nodes() {
    let (_transport, nodes) = InMemoryClusterBuilder::new().with_nodes(3).build();
    let mut cluster = Cluster::new(Box::new(RoundRobinSelector::default()));
    for node in &nodes {
        cluster.add(Arc::clone(node));
    }

    assert_eq!(cluster.bid(bid("A", 100)).await, Ok(BidOutcome::Accepted));
    assert_eq!(
        cluster.bid(bid("B", 90)).await,
        Ok(BidOutcome::Rejected(Rejection::BidTooLow))
    );
    assert_eq!(cluster.bid(bid("B", 150)).await, Ok(BidOutcome::Accepted));
    assert_eq!(cluster.result().await, Ok(Some(bid("B", 150))));
    assert_eq!(cluster.end().await, Ok(EndStatus::Ended));
    assert_eq!(cluster.end().await, Ok(EndStatus::AlreadyEnded));
}
