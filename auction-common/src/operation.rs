use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{bid::Bid, utils::{time::current_time, NodeId}};

/// Idempotency token minted once per client operation at its entry node.
///
/// Every delivery attempt of the same operation carries the same id, so a
/// receiver can drop retries it has already applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(pub Uuid);

impl OperationId {
    pub fn new() -> Self {
        OperationId(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    Bid(Bid),
    End,
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Bid(_) => "bid",
            Operation::End => "end",
        }
    }
}

/// What a replication transport actually carries between nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: OperationId,
    pub origin: NodeId,
    pub sent_at: i64,
    pub operation: Operation,
}

impl Envelope {
    pub fn new(origin: NodeId, operation: Operation) -> Self {
        Envelope {
            id: OperationId::new(),
            origin,
            sent_at: current_time(),
            operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_envelope_json_shape() {
        let bid = Bid::new("alice", 150).unwrap();
        let env = Envelope::new(NodeId::from("node-1"), Operation::Bid(bid));

        let value: Value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["origin"], json!("node-1"));
        assert_eq!(
            value["operation"],
            json!({"type": "bid", "bidder": "alice", "amount": 150})
        );

        let end = Envelope::new(NodeId::from("node-2"), Operation::End);
        let value: Value = serde_json::to_value(&end).unwrap();
        assert_eq!(value["operation"], json!({"type": "end"}));
    }

    #[test]
    fn test_envelope_with_empty_bidder_is_refused() {
        let raw = json!({
            "id": Uuid::new_v4(),
            "origin": "node-1",
            "sent_at": 0,
            "operation": {"type": "bid", "bidder": "", "amount": 5}
        });
        assert!(serde_json::from_value::<Envelope>(raw).is_err());
    }

    #[test]
    fn test_operation_ids_are_unique() {
        assert_ne!(OperationId::new(), OperationId::new());
    }
}
