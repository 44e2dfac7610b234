//! HTTP routes and JSON bodies shared by the node server, the replication
//! transport and the client.

use serde::{Deserialize, Serialize};

use crate::bid::{Bid, BidOutcome, EndStatus, Rejection};

pub const BID_PATH: &str = "/bid";
pub const RESULT_PATH: &str = "/result";
pub const END_PATH: &str = "/end";
pub const REPLICATE_PATH: &str = "/replicate";
pub const HEALTH_PATH: &str = "/health";

/// Client bid request. Validation into a [`Bid`] happens in the API layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidRequest {
    pub bidder: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidResponse {
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<BidOutcome> for BidResponse {
    fn from(outcome: BidOutcome) -> Self {
        BidResponse {
            outcome: outcome.as_wire().to_string(),
            reason: outcome.rejection().map(|r| r.as_str().to_string()),
        }
    }
}

impl BidResponse {
    /// Decodes the outcome a node reported. `None` for an unknown outcome tag, or for
    /// a `"fail"` whose reason is missing or unknown.
    pub fn to_outcome(&self) -> Option<BidOutcome> {
        match (self.outcome.as_str(), self.reason.as_deref()) {
            ("success", _) => Some(BidOutcome::Accepted),
            ("fail", Some(reason)) => [Rejection::AuctionEnded, Rejection::BidTooLow]
                .into_iter()
                .find(|r| r.as_str() == reason)
                .map(BidOutcome::Rejected),
            _ => None,
        }
    }
}

/// Highest bid, or the empty-bidder sentinel when nothing was bid yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultResponse {
    pub bidder: String,
    pub amount: i64,
}

impl ResultResponse {
    pub fn into_bid(self) -> Option<Bid> {
        if self.bidder.is_empty() {
            return None;
        }
        Bid::new(self.bidder, self.amount).ok()
    }
}

impl From<Option<Bid>> for ResultResponse {
    fn from(bid: Option<Bid>) -> Self {
        match bid {
            Some(bid) => ResultResponse {
                bidder: bid.bidder().to_string(),
                amount: bid.amount(),
            },
            None => ResultResponse {
                bidder: String::new(),
                amount: 0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndResponse {
    pub status: EndStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicateResponse {
    pub applied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub node: String,
    pub ended: bool,
    pub peers: usize,
    pub deliveries_ok: u64,
    pub deliveries_failed: u64,
    pub duplicates_ignored: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
