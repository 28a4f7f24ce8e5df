//! Flight disruption claims: compensation estimates, funnel progress gating,
//! and the boundary to the external claims-processing API.

pub mod compensation;
pub mod domain;
pub mod estimate;
pub mod progress;
pub mod router;
pub mod service;
pub mod session;
pub mod submission;
pub mod upstream;

#[cfg(test)]
mod tests;

pub use compensation::{
    classify, lookup_base_amount, AmountBasis, BaseAmountQuote, ClaimScenario,
    CompensationConfig, CompensationEngine, CompensationVerdict, Currency, DelayBucket,
    InformedDate, IssueKind, NoticeBucket, ReasonCode,
};
pub use domain::{
    great_circle_km, Airport, AirportSelection, FlightLeg, FlightLegError, IataCode, WizardAnswer,
};
pub use estimate::{EstimateCoordinator, EstimateResolution, EstimateTicket, TrackedEstimate};
pub use progress::{
    ClaimDraft, ClaimOutcome, FieldError, Phase, PhaseAction, PhaseEvent, PhaseMachine,
    PhaseState, PhaseValidation, ProgressStore, ProgressStoreError,
};
pub use router::claim_router;
pub use service::{ClaimService, ClaimServiceError, EstimateRequest, RouteCompensation};
pub use session::ClaimSessions;
pub use submission::{
    ClaimEvaluation, ClaimEvaluationOutcome, ClaimEvaluationRequest, ClaimOrder, ClaimOrderDraft,
    EvaluationStatus, JourneyFactType, MissingFields, OrderReceipt, Salutation,
    SubmissionOutcome,
};
pub use upstream::{ClaimsGateway, HttpClaimsGateway, RetryPolicy, UpstreamError};
