use serde::{Deserialize, Serialize};
use tracing::debug;

use super::state::{ClaimOutcome, Phase, PhaseState};
use super::validation::{validate_phase, ClaimDraft, FieldError};

/// User intents fed into [`PhaseMachine::dispatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhaseAction {
    /// Navigate to an ordinal phase. Unknown ordinals are redirected.
    RequestPhase { target: u8 },
    /// Show one of the terminal screens.
    RequestOutcome { outcome: ClaimOutcome },
    CompletePhase { phase: Phase },
    /// "Continue" on the current phase.
    Advance,
    Touch { phase: Phase },
    /// The user edited data owned by `phase`; it and everything after it must be redone.
    Invalidate { phase: Phase },
    Conclude { outcome: ClaimOutcome },
    SwitchLocale { locale: String },
    Restart,
}

/// What a dispatched action did to the state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PhaseEvent {
    Navigated {
        phase: Phase,
    },
    Redirected {
        requested: u8,
        phase: Phase,
    },
    OutcomeShown {
        outcome: ClaimOutcome,
    },
    Completed {
        phase: Phase,
        newly_completed: bool,
    },
    CompletionRejected {
        phase: Phase,
        missing: Vec<Phase>,
    },
    Advanced {
        from: Phase,
        to: Phase,
    },
    Blocked {
        phase: Phase,
        errors: Vec<FieldError>,
    },
    Touched {
        phase: Phase,
    },
    Invalidated {
        phase: Phase,
        cleared: Vec<Phase>,
    },
    Concluded {
        outcome: ClaimOutcome,
    },
    LocaleSwitched {
        locale: String,
    },
    Restarted,
}

/// Reducer over [`PhaseState`].
///
/// The machine owns no state itself; callers pass the state in and persist it
/// afterwards. `debug_override` lifts every ordering gate and must stay off
/// outside development and test.
/// Whether this build can honour the phase override at all. Release builds
/// need the `phase-override` feature.
pub const PHASE_OVERRIDE_COMPILED: bool =
    cfg!(any(test, debug_assertions, feature = "phase-override"));

#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseMachine {
    debug_override: bool,
}

impl PhaseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the override; ignored unless [`PHASE_OVERRIDE_COMPILED`].
    pub fn with_debug_override(debug_override: bool) -> Self {
        Self {
            debug_override: debug_override && PHASE_OVERRIDE_COMPILED,
        }
    }

    pub fn debug_override(&self) -> bool {
        self.debug_override
    }

    pub fn dispatch(
        &self,
        state: &mut PhaseState,
        action: PhaseAction,
        draft: &ClaimDraft,
    ) -> PhaseEvent {
        match action {
            PhaseAction::RequestPhase { target } => self.request_phase(state, target),
            PhaseAction::RequestOutcome { outcome } => self.request_outcome(state, outcome),
            PhaseAction::CompletePhase { phase } => self.complete_phase(state, phase),
            PhaseAction::Advance => self.advance(state, draft),
            PhaseAction::Touch { phase } => {
                state.interacted.insert(phase);
                PhaseEvent::Touched { phase }
            }
            PhaseAction::Invalidate { phase } => self.invalidate(state, phase),
            PhaseAction::Conclude { outcome } => self.conclude(state, outcome),
            PhaseAction::SwitchLocale { locale } => {
                state.locale = Some(locale.clone());
                PhaseEvent::LocaleSwitched { locale }
            }
            PhaseAction::Restart => {
                *state = PhaseState::default();
                PhaseEvent::Restarted
            }
        }
    }

    /// Permitted when going back, when the preceding phase is done, or under
    /// the debug override. Anything else lands on [`PhaseState::resume_phase`].
    pub fn request_phase(&self, state: &mut PhaseState, target: u8) -> PhaseEvent {
        let permitted = Phase::from_ordinal(target).filter(|phase| {
            self.debug_override
                || *phase <= state.current_phase
                || phase
                    .previous()
                    .map(|previous| state.is_complete(previous))
                    .unwrap_or(true)
        });

        match permitted {
            Some(phase) => {
                state.current_phase = phase;
                PhaseEvent::Navigated { phase }
            }
            None => {
                let phase = state.resume_phase();
                debug!(requested = target, redirect = phase.ordinal(), "phase request redirected");
                state.current_phase = phase;
                PhaseEvent::Redirected {
                    requested: target,
                    phase,
                }
            }
        }
    }

    /// Terminal screens are only reachable once a claim has concluded; after
    /// that the user may move freely between them.
    pub fn request_outcome(&self, state: &mut PhaseState, outcome: ClaimOutcome) -> PhaseEvent {
        if state.outcome.is_some() || self.debug_override {
            state.outcome = Some(outcome);
            return PhaseEvent::OutcomeShown { outcome };
        }

        let phase = state.resume_phase();
        state.current_phase = phase;
        PhaseEvent::Redirected {
            requested: Phase::LAST.ordinal() + 1,
            phase,
        }
    }

    /// Idempotent. Requires every earlier phase to be complete unless the debug
    /// override is on. Does not move the current phase.
    pub fn complete_phase(&self, state: &mut PhaseState, phase: Phase) -> PhaseEvent {
        let missing = state.missing_before(phase);
        if !missing.is_empty() && !self.debug_override {
            return PhaseEvent::CompletionRejected { phase, missing };
        }

        let newly_completed = state.completed_phases.insert(phase);
        PhaseEvent::Completed {
            phase,
            newly_completed,
        }
    }

    pub fn advance(&self, state: &mut PhaseState, draft: &ClaimDraft) -> PhaseEvent {
        let from = state.current_phase;
        let validation = validate_phase(from, draft);
        state.interacted.insert(from);
        state
            .per_phase_validation
            .insert(from, validation.clone());

        if !validation.valid {
            return PhaseEvent::Blocked {
                phase: from,
                errors: validation.errors,
            };
        }

        if let rejected @ PhaseEvent::CompletionRejected { .. } = self.complete_phase(state, from) {
            return rejected;
        }

        let to = from.next().unwrap_or(from);
        state.current_phase = to;
        PhaseEvent::Advanced { from, to }
    }

    fn invalidate(&self, state: &mut PhaseState, phase: Phase) -> PhaseEvent {
        let cleared: Vec<Phase> = state
            .completed_phases
            .iter()
            .copied()
            .filter(|completed| *completed >= phase)
            .collect();
        state.completed_phases.retain(|completed| *completed < phase);
        state.outcome = None;
        if state.current_phase > phase {
            state.current_phase = phase;
        }
        PhaseEvent::Invalidated { phase, cleared }
    }

    fn conclude(&self, state: &mut PhaseState, outcome: ClaimOutcome) -> PhaseEvent {
        if !state.is_complete(Phase::LAST) && !self.debug_override {
            let phase = state.resume_phase();
            state.current_phase = phase;
            return PhaseEvent::Redirected {
                requested: Phase::LAST.ordinal() + 1,
                phase,
            };
        }
        state.outcome = Some(outcome);
        PhaseEvent::Concluded { outcome }
    }
}
