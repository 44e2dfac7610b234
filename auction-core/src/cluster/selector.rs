use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chooses which of `candidates` live nodes receives the next client operation.
pub trait NodeSelector: Send + Sync {
    /// Index in `0..candidates`, or `None` when there is nothing to choose from.
    fn select(&self, candidates: usize) -> Option<usize>;
}

#[derive(Debug, Default)]
pub struct RandomSelector;

impl NodeSelector for RandomSelector {
    fn select(&self, candidates: usize) -> Option<usize> {
        if candidates == 0 {
            return None;
        }
        Some(rand::thread_rng().gen_range(0..candidates))
    }
}

#[derive(Debug, Default)]
pub struct RoundRobinSelector {
    next: AtomicUsize,
}

impl NodeSelector for RoundRobinSelector {
    fn select(&self, candidates: usize) -> Option<usize> {
        if candidates == 0 {
            return None;
        }
        Some(self.next.fetch_add(1, Ordering::Relaxed) % candidates)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    #[default]
    Random,
    RoundRobin,
}

impl SelectionPolicy {
    pub fn selector(self) -> Box<dyn NodeSelector> {
        match self {
            SelectionPolicy::Random => Box::new(RandomSelector),
            SelectionPolicy::RoundRobin => Box::new(RoundRobinSelector::default()),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown selection policy '{0}' (random|round-robin)")]
pub struct ParsePolicyError(String);

impl FromStr for SelectionPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(SelectionPolicy::Random),
            "round-robin" | "round_robin" | "roundrobin" => Ok(SelectionPolicy::RoundRobin),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPolicy::Random => f.write_str("random"),
            SelectionPolicy::RoundRobin => f.write_str("round-robin"),
        }
    }
}
