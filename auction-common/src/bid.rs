use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AuctionError;

/// A single bid. Immutable once built; the bidder is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBid")]
pub struct Bid {
    bidder: String,
    amount: i64,
}

#[derive(Deserialize)]
struct RawBid {
    bidder: String,
    amount: i64,
}

impl TryFrom<RawBid> for Bid {
    type Error = AuctionError;

    fn try_from(raw: RawBid) -> Result<Self, Self::Error> {
        Bid::new(raw.bidder, raw.amount)
    }
}

impl Bid {
    pub fn new(bidder: impl Into<String>, amount: i64) -> Result<Self, AuctionError> {
        let bidder = bidder.into();
        if bidder.trim().is_empty() {
            return Err(AuctionError::EmptyBidder);
        }
        Ok(Bid { bidder, amount })
    }

    pub fn bidder(&self) -> &str {
        &self.bidder
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with {}", self.bidder, self.amount)
    }
}

/// Why a bid was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    AuctionEnded,
    /// Amount not strictly greater than the current highest bid.
    BidTooLow,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::AuctionEnded => "auction ended",
            Rejection::BidTooLow => "bid too low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidOutcome {
    Accepted,
    Rejected(Rejection),
}

impl BidOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, BidOutcome::Accepted)
    }

    /// Wire tag: `success` or `fail`.
    pub fn as_wire(&self) -> &'static str {
        match self {
            BidOutcome::Accepted => "success",
            BidOutcome::Rejected(_) => "fail",
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            BidOutcome::Accepted => None,
            BidOutcome::Rejected(reason) => Some(*reason),
        }
    }
}

impl fmt::Display for BidOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndStatus {
    #[serde(rename = "ended")]
    Ended,
    #[serde(rename = "already ended")]
    AlreadyEnded,
}

impl EndStatus {
    pub fn as_wire(&self) -> &'static str {
        match self {
            EndStatus::Ended => "ended",
            EndStatus::AlreadyEnded => "already ended",
        }
    }
}

impl fmt::Display for EndStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}
