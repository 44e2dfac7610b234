//! utils
//!
//! Small shared helpers: node identifiers and wall-clock time.

pub mod node_id;
pub use node_id::NodeId;

pub mod time;
