use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use auction_common::{Envelope, NodeId};
use tracing::trace;

use crate::replica::Replica;

use super::{error::TransportError, traits::ReplicationTransport};

/// In-process transport: delivery is a direct call into the peer's replica.
///
/// Cloning shares the registry, so every node of a simulated cluster can hold
/// its own handle.
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    replicas: Arc<RwLock<HashMap<NodeId, Arc<Replica>>>>,
    down: Arc<RwLock<HashSet<NodeId>>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: NodeId, replica: Arc<Replica>) {
        self.replicas
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, replica);
    }

    /// Deliveries to `id` fail with `PeerUnreachable` until [`reconnect`](Self::reconnect).
    pub fn disconnect(&self, id: &NodeId) {
        self.down
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone());
    }

    pub fn reconnect(&self, id: &NodeId) {
        self.down
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);
    }

    pub fn is_connected(&self, id: &NodeId) -> bool {
        !self
            .down
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }
}

#[async_trait]
impl ReplicationTransport for InMemoryTransport {
    async fn deliver(&self, peer: &NodeId, envelope: &Envelope) -> Result<(), TransportError> {
        if !self.is_connected(peer) {
            return Err(TransportError::PeerUnreachable(peer.to_string()));
        }

        let replica = {
            let replicas = self.replicas.read().unwrap_or_else(PoisonError::into_inner);
            replicas.get(peer).cloned()
        };

        let replica = replica.ok_or_else(|| TransportError::PeerNotFound(peer.to_string()))?;
        let applied = replica.apply(envelope);
        trace!(%peer, op = %envelope.id, ?applied, "in-memory delivery");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auction_common::{Bid, Operation};

    #[tokio::test]
    async fn test_delivery_reaches_registered_replica() {
        let transport = InMemoryTransport::new();
        let replica = Arc::new(Replica::new());
        transport.register(NodeId::from("b"), Arc::clone(&replica));

        let env = Envelope::new(
            NodeId::from("a"),
            Operation::Bid(Bid::new("alice", 7).unwrap()),
        );
        transport.deliver(&NodeId::from("b"), &env).await.unwrap();

        assert_eq!(replica.state().result().map(|b| b.amount()), Some(7));
    }

    #[tokio::test]
    async fn test_unknown_and_disconnected_peers_fail() {
        let transport = InMemoryTransport::new();
        let env = Envelope::new(NodeId::from("a"), Operation::End);

        let err = transport.deliver(&NodeId::from("ghost"), &env).await.unwrap_err();
        assert_eq!(err, TransportError::PeerNotFound("ghost".into()));

        let replica = Arc::new(Replica::new());
        transport.register(NodeId::from("b"), Arc::clone(&replica));
        transport.disconnect(&NodeId::from("b"));

        let err = transport.deliver(&NodeId::from("b"), &env).await.unwrap_err();
        assert_eq!(err, TransportError::PeerUnreachable("b".into()));
        assert!(!replica.state().is_ended());

        transport.reconnect(&NodeId::from("b"));
        transport.deliver(&NodeId::from("b"), &env).await.unwrap();
        assert!(replica.state().is_ended());
    }
}
