pub mod bid;
pub mod error;
pub mod operation;
pub mod utils;
pub mod wire;

pub use bid::{Bid, BidOutcome, EndStatus, Rejection};
pub use error::AuctionError;
pub use operation::{Envelope, Operation, OperationId};
pub use utils::NodeId;
