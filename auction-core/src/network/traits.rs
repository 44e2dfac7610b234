use async_trait::async_trait;
use auction_common::{Envelope, NodeId};

use super::error::TransportError;

/// Delivers one operation to one named peer.
///
/// Implementations differ only in how they reach the peer (direct call, HTTP);
/// a single call is one attempt, with no retry of its own.
#[async_trait]
pub trait ReplicationTransport: Send + Sync {
    async fn deliver(&self, peer: &NodeId, envelope: &Envelope) -> Result<(), TransportError>;
}
