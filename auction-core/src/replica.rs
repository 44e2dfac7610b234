use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use auction_common::{BidOutcome, EndStatus, Envelope, Operation, OperationId};

use crate::state::AuctionState;

const APPLIED_LOG_CAPACITY: usize = 50_000;

/// Result of applying a replicated envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Bid(BidOutcome),
    End(EndStatus),
    /// Operation id already seen; state untouched.
    Duplicate,
}

#[derive(Debug, Default)]
struct AppliedLog {
    seen: HashSet<OperationId>,
    order: VecDeque<OperationId>,
}

impl AppliedLog {
    fn insert(&mut self, id: OperationId) -> bool {
        if !self.seen.insert(id) {
            return false;
        }
        self.order.push_back(id);
        while self.order.len() > APPLIED_LOG_CAPACITY {
            if let Some(old) = self.order.pop_front() {
                self.seen.remove(&old);
            }
        }
        true
    }
}

/// One node's auction state together with the ids of operations it has applied.
///
/// This is the only thing a peer can reach through a transport: it never sees the
/// node's peer list, so applying here never triggers another broadcast.
#[derive(Debug, Default)]
pub struct Replica {
    state: AuctionState,
    applied: Mutex<AppliedLog>,
    duplicates: AtomicU64,
}

impl Replica {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AuctionState {
        &self.state
    }

    /// Records `id` as applied. Returns false if it was already known.
    pub fn mark_applied(&self, id: OperationId) -> bool {
        self.applied
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id)
    }

    pub fn duplicates_ignored(&self) -> u64 {
        self.duplicates.load(Ordering::Relaxed)
    }

    pub fn apply(&self, envelope: &Envelope) -> Applied {
        if !self.mark_applied(envelope.id) {
            self.duplicates.fetch_add(1, Ordering::Relaxed);
            return Applied::Duplicate;
        }

        match &envelope.operation {
            Operation::Bid(bid) => Applied::Bid(self.state.bid(bid.clone())),
            Operation::End => Applied::End(self.state.end()),
        }
    }
}
