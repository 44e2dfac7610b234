//! state.rs
//!
//! The per-node auction record. All reads and writes go through one mutex, so a
//! bid's compare-and-replace of the highest bid never interleaves with another
//! operation on the same state.

use std::sync::{Mutex, MutexGuard, PoisonError};

use auction_common::{Bid, BidOutcome, EndStatus, Rejection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
struct Inner {
    highest_bid: Option<Bid>,
    ended: bool,
}

/// Consistent copy of an [`AuctionState`] taken under its lock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub highest_bid: Option<Bid>,
    pub ended: bool,
}

/// Highest bid plus the ended flag for one node.
///
/// Once ended, nothing changes again. Accepted amounts strictly increase; a bid
/// equal to the incumbent never replaces it.
#[derive(Debug, Default)]
pub struct AuctionState {
    inner: Mutex<Inner>,
}

impl AuctionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bid(&self, bid: Bid) -> BidOutcome {
        let mut inner = self.lock();

        if inner.ended {
            return BidOutcome::Rejected(Rejection::AuctionEnded);
        }

        if let Some(current) = &inner.highest_bid {
            if bid.amount() <= current.amount() {
                return BidOutcome::Rejected(Rejection::BidTooLow);
            }
        }

        inner.highest_bid = Some(bid);
        BidOutcome::Accepted
    }

    pub fn result(&self) -> Option<Bid> {
        self.lock().highest_bid.clone()
    }

    pub fn end(&self) -> EndStatus {
        let mut inner = self.lock();
        if inner.ended {
            return EndStatus::AlreadyEnded;
        }
        inner.ended = true;
        EndStatus::Ended
    }

    pub fn is_ended(&self) -> bool {
        self.lock().ended
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let inner = self.lock();
        StateSnapshot {
            highest_bid: inner.highest_bid.clone(),
            ended: inner.ended,
        }
    }

    // Every critical section is a single read-modify-write, so a poisoned guard
    // still holds a consistent record.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
