use async_trait::async_trait;
use auction_common::{Bid, BidOutcome, EndStatus};

use crate::network::error::TransportError;

use super::node::Node;

/// Something a client front-end can route auction operations to: an in-process
/// [`Node`] or a remote one behind HTTP.
#[async_trait]
pub trait AuctionEndpoint: Send + Sync {
    fn name(&self) -> String;
    async fn bid(&self, bid: Bid) -> Result<BidOutcome, TransportError>;
    async fn result(&self) -> Result<Option<Bid>, TransportError>;
    async fn end(&self) -> Result<EndStatus, TransportError>;
}

#[async_trait]
impl AuctionEndpoint for Node {
    fn name(&self) -> String {
        self.id().to_string()
    }

    async fn bid(&self, bid: Bid) -> Result<BidOutcome, TransportError> {
        Ok(Node::bid(self, bid).await)
    }

    async fn result(&self) -> Result<Option<Bid>, TransportError> {
        Ok(Node::result(self))
    }

    async fn end(&self) -> Result<EndStatus, TransportError> {
        Ok(Node::end(self).await)
    }
}
