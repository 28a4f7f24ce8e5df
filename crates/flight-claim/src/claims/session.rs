use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::debug;

use super::estimate::EstimateCoordinator;
use super::progress::{
    load_progress, save_progress, storage_key, ClaimDraft, PhaseAction, PhaseEvent, PhaseMachine,
    PhaseState, ProgressStore, ProgressStoreError,
};

const WRITE_LOCK_STRIPES: usize = 64;
const DEFAULT_MAX_TRACKED_ESTIMATES: usize = 10_000;
const DEFAULT_ESTIMATE_IDLE: Duration = Duration::from_secs(30 * 60);

struct TrackedEstimates {
    coordinator: Arc<EstimateCoordinator>,
    last_used: Instant,
}

/// Per-visitor progress and estimate bookkeeping on top of a [`ProgressStore`].
pub struct ClaimSessions<S> {
    store: Arc<S>,
    machine: PhaseMachine,
    // Read-modify-write of one session is serialized on its stripe.
    write_locks: Vec<Mutex<()>>,
    estimates: Mutex<HashMap<String, TrackedEstimates>>,
    max_tracked: usize,
    estimate_idle: Duration,
}

impl<S> ClaimSessions<S>
where
    S: ProgressStore + 'static,
{
    pub fn new(store: Arc<S>, machine: PhaseMachine) -> Self {
        Self {
            store,
            machine,
            write_locks: (0..WRITE_LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
            estimates: Mutex::new(HashMap::new()),
            max_tracked: DEFAULT_MAX_TRACKED_ESTIMATES,
            estimate_idle: DEFAULT_ESTIMATE_IDLE,
        }
    }

    /// Bound the estimate registry: at most `max_tracked` sessions, and entries
    /// idle for longer than `idle` are dropped first.
    pub fn with_estimate_limits(mut self, max_tracked: usize, idle: Duration) -> Self {
        self.max_tracked = max_tracked.max(1);
        self.estimate_idle = idle;
        self
    }

    pub fn machine(&self) -> PhaseMachine {
        self.machine
    }

    pub fn load(&self, session: &str) -> Result<PhaseState, ProgressStoreError> {
        load_progress(self.store.as_ref(), &storage_key(session))
    }

    /// Apply one action and persist the resulting state.
    pub fn apply(
        &self,
        session: &str,
        action: PhaseAction,
        draft: &ClaimDraft,
    ) -> Result<(PhaseEvent, PhaseState), ProgressStoreError> {
        let key = storage_key(session);
        let restart = matches!(action, PhaseAction::Restart);

        let (event, state) = {
            let _guard = self.write_lock(&key);
            let mut state = load_progress(self.store.as_ref(), &key)?;
            let event = self.machine.dispatch(&mut state, action, draft);
            save_progress(self.store.as_ref(), &key, &state)?;
            (event, state)
        };

        if restart {
            self.lock_estimates().remove(session);
        }
        debug!(key = %key, ?event, "progress updated");
        Ok((event, state))
    }

    pub fn coordinator(&self, session: &str) -> Arc<EstimateCoordinator> {
        let now = Instant::now();
        let mut estimates = self.lock_estimates();

        if let Some(tracked) = estimates.get_mut(session) {
            tracked.last_used = now;
            return tracked.coordinator.clone();
        }

        if estimates.len() >= self.max_tracked {
            let idle = self.estimate_idle;
            estimates.retain(|_, tracked| now.duration_since(tracked.last_used) < idle);
        }
        if estimates.len() >= self.max_tracked {
            let oldest = estimates
                .iter()
                .min_by_key(|(_, tracked)| tracked.last_used)
                .map(|(session, _)| session.clone());
            if let Some(oldest) = oldest {
                debug!(session = %oldest, "evicting estimate tracking");
                estimates.remove(&oldest);
            }
        }

        let coordinator = Arc::new(EstimateCoordinator::new());
        estimates.insert(
            session.to_string(),
            TrackedEstimates {
                coordinator: coordinator.clone(),
                last_used: now,
            },
        );
        coordinator
    }

    /// Number of sessions currently holding an estimate coordinator.
    pub fn tracked_estimates(&self) -> usize {
        self.lock_estimates().len()
    }

    fn write_lock(&self, key: &str) -> MutexGuard<'_, ()> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let stripe = (hasher.finish() % self.write_locks.len() as u64) as usize;
        self.write_locks[stripe]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_estimates(&self) -> MutexGuard<'_, HashMap<String, TrackedEstimates>> {
        self.estimates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
