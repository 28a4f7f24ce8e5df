//! Funnel progress gating: which phase a visitor may see and when a phase counts as done.

mod machine;
mod state;
mod store;
mod validation;

pub use machine::{PhaseAction, PhaseEvent, PhaseMachine, PHASE_OVERRIDE_COMPILED};
pub use state::{ClaimOutcome, Phase, PhaseState, UnknownPhase};
pub use store::{
    load_progress, save_progress, storage_key, ProgressStore, ProgressStoreError,
    PROGRESS_STORAGE_KEY,
};
pub use validation::{validate_phase, ClaimDraft, FieldError, PhaseValidation};
