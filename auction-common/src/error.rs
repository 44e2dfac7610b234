use thiserror::Error;

/// Errors raised by the interface layer before anything reaches an auction state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuctionError {
    #[error("bidder must not be empty")]
    EmptyBidder,
}
