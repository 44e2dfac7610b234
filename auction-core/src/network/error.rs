use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Peer {0} not found")]
    PeerNotFound(String),

    #[error("Peer {0} unreachable")]
    PeerUnreachable(String),

    #[error("Delivery to {peer} timed out after {after_ms} ms")]
    Timeout { peer: String, after_ms: u64 },

    #[error("Peer {peer} rejected delivery with status {status}")]
    Rejected { peer: String, status: u16 },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TransportError {
    /// Whether another attempt could plausibly succeed. A 4xx answer is permanent:
    /// the peer is not an auction node or refuses the envelope itself.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::PeerNotFound(_) | TransportError::Serialization(_) => false,
            TransportError::Rejected { status, .. } => !(400..500).contains(status),
            _ => true,
        }
    }
}
