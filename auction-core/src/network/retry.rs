use std::time::Duration;

use auction_common::{Envelope, NodeId};
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, timeout};
use tracing::debug;

use super::{error::TransportError, traits::ReplicationTransport};

/// Bounded retry for one peer delivery.
///
/// Safe because every attempt carries the same operation id and receivers drop
/// ids they have already applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout_ms: u64,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout_ms: 2_000,
            backoff_base_ms: 100,
            backoff_max_ms: 2_000,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no backoff.
    pub fn no_retry(attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: 1,
            attempt_timeout_ms: attempt_timeout.as_millis() as u64,
            backoff_base_ms: 0,
            backoff_max_ms: 0,
        }
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// Delay before attempt `attempt + 1` (1-based `attempt`): base * 2^(attempt-1), capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        let ms = self.backoff_base_ms.saturating_mul(factor).min(self.backoff_max_ms);
        Duration::from_millis(ms)
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryReport {
    pub peer: NodeId,
    pub attempts: u32,
    pub result: Result<(), TransportError>,
}

impl DeliveryReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

pub async fn deliver_with_retry(
    transport: &dyn ReplicationTransport,
    peer: &NodeId,
    envelope: &Envelope,
    policy: &RetryPolicy,
) -> DeliveryReport {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;

        let result = match timeout(policy.attempt_timeout(), transport.deliver(peer, envelope)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                peer: peer.to_string(),
                after_ms: policy.attempt_timeout_ms,
            }),
        };

        match result {
            Ok(()) => {
                return DeliveryReport { peer: peer.clone(), attempts, result: Ok(()) };
            }
            Err(e) if e.is_retryable() && attempts < max_attempts => {
                let delay = policy.backoff(attempts);
                debug!(%peer, op = %envelope.id, attempt = attempts, error = %e, "delivery failed, retrying in {:?}", delay);
                sleep(delay).await;
            }
            Err(e) => {
                return DeliveryReport { peer: peer.clone(), attempts, result: Err(e) };
            }
        }
    }
}
