use std::time::Duration;

use async_trait::async_trait;
use auction_common::{wire::REPLICATE_PATH, Envelope, NodeId};
use reqwest::Client;

use super::{error::TransportError, traits::ReplicationTransport};

/// Network transport: POSTs the envelope as JSON to `<peer>/replicate`.
///
/// Peer ids are base URLs such as `http://127.0.0.1:8001`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    request_timeout: Duration,
}

impl HttpTransport {
    pub fn new(request_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;
        Ok(HttpTransport { client, request_timeout })
    }

    fn endpoint(peer: &NodeId) -> String {
        format!("{}{}", peer.as_str().trim_end_matches('/'), REPLICATE_PATH)
    }
}

pub fn map_reqwest_error(peer: &str, timeout: Duration, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            peer: peer.to_string(),
            after_ms: timeout.as_millis() as u64,
        }
    } else if err.is_connect() {
        TransportError::PeerUnreachable(peer.to_string())
    } else {
        TransportError::Http(err.to_string())
    }
}

#[async_trait]
impl ReplicationTransport for HttpTransport {
    async fn deliver(&self, peer: &NodeId, envelope: &Envelope) -> Result<(), TransportError> {
        let response = self
            .client
            .post(Self::endpoint(peer))
            .json(envelope)
            .send()
            .await
            .map_err(|e| map_reqwest_error(peer.as_str(), self.request_timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Rejected {
                peer: peer.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
