use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::Serialize;
use tracing::debug;

use super::compensation::CompensationVerdict;

/// Issued when an estimate starts; only the newest ticket may publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EstimateTicket {
    generation: u64,
}

impl EstimateTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedEstimate {
    pub generation: u64,
    pub verdict: CompensationVerdict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "resolution", rename_all = "snake_case")]
pub enum EstimateResolution {
    Applied(TrackedEstimate),
    /// A newer estimate was started after this one; the result was dropped.
    Superseded { generation: u64, current: u64 },
}

/// Serializes concurrent estimates for one visitor so a slow response never
/// overwrites the result of a newer input.
#[derive(Debug, Default)]
pub struct EstimateCoordinator {
    generation: AtomicU64,
    latest: Mutex<Option<TrackedEstimate>>,
}

impl EstimateCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> EstimateTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        EstimateTicket { generation }
    }

    pub fn is_current(&self, ticket: EstimateTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    pub fn resolve(&self, ticket: EstimateTicket, verdict: CompensationVerdict) -> EstimateResolution {
        let mut latest = self.latest.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let current = self.generation.load(Ordering::SeqCst);
        if current != ticket.generation {
            debug!(
                generation = ticket.generation,
                current, "discarding superseded estimate"
            );
            return EstimateResolution::Superseded {
                generation: ticket.generation,
                current,
            };
        }

        let tracked = TrackedEstimate {
            generation: ticket.generation,
            verdict,
        };
        *latest = Some(tracked.clone());
        EstimateResolution::Applied(tracked)
    }

    /// Most recent estimate that was not superseded.
    pub fn latest(&self) -> Option<TrackedEstimate> {
        self.latest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
