// lib.rs
pub mod cluster;
pub mod network;
pub mod replica;
pub mod state;

pub use cluster::{
    builder::InMemoryClusterBuilder,
    core::{Cluster, ClusterError},
    endpoint::AuctionEndpoint,
    node::{FanOutMode, Node, NodeStats},
    selector::{NodeSelector, RandomSelector, RoundRobinSelector, SelectionPolicy},
};
pub use network::{
    error::TransportError,
    http::HttpTransport,
    in_memory::InMemoryTransport,
    retry::{deliver_with_retry, DeliveryReport, RetryPolicy},
    traits::ReplicationTransport,
};
pub use replica::{Applied, Replica};
pub use state::{AuctionState, StateSnapshot};
