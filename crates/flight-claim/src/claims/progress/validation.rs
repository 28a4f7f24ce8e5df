use serde::{Deserialize, Serialize};

use super::state::Phase;
use crate::claims::compensation::{classify, IssueKind};
use crate::claims::domain::{AirportSelection, FlightLeg, WizardAnswer};
use crate::claims::submission::JourneyFactType;

/// A single field-level problem shown next to the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhaseValidation {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl PhaseValidation {
    fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Claim data collected so far; each phase checks its own slice of it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimDraft {
    pub answers: Vec<WizardAnswer>,
    pub origin: AirportSelection,
    pub destination: AirportSelection,
    pub selected_flight: Option<FlightLeg>,
    pub booking_reference: Option<String>,
    pub journey_fact: Option<JourneyFactType>,
    pub terms_accepted: bool,
    pub privacy_accepted: bool,
    pub signature: Option<String>,
}

pub fn validate_phase(phase: Phase, draft: &ClaimDraft) -> PhaseValidation {
    let errors = match phase {
        Phase::InitialAssessment => initial_assessment(draft),
        Phase::CompensationEstimate => compensation_estimate(draft),
        Phase::FlightDetails => flight_details(draft),
        Phase::TripExperience => trip_experience(draft),
        Phase::ClaimAgreement => claim_agreement(draft),
    };
    PhaseValidation::from_errors(errors)
}

fn initial_assessment(draft: &ClaimDraft) -> Vec<FieldError> {
    let scenario = classify(&draft.answers);
    let mut errors = Vec::new();
    match scenario.issue {
        None => errors.push(FieldError::new(
            "what_happened",
            "Tell us what happened to your flight.",
        )),
        Some(IssueKind::Delayed | IssueKind::MissedConnection) if scenario.delay.is_none() => {
            errors.push(FieldError::new(
                "delay_duration",
                "Select how late you arrived at your destination.",
            ))
        }
        Some(IssueKind::Cancelled) if scenario.notice.is_none() => errors.push(FieldError::new(
            "cancellation_notice",
            "Select when the airline told you about the cancellation.",
        )),
        Some(_) => {}
    }
    errors
}

fn compensation_estimate(draft: &ClaimDraft) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !draft.origin.is_set() {
        errors.push(FieldError::new("origin", "Select your departure airport."));
    }
    if !draft.destination.is_set() {
        errors.push(FieldError::new(
            "destination",
            "Select your destination airport.",
        ));
    }
    if let (Some(origin), Some(destination)) = (draft.origin.iata(), draft.destination.iata()) {
        if origin == destination {
            errors.push(FieldError::new(
                "destination",
                "Departure and destination airports must differ.",
            ));
        }
    }
    errors
}

fn flight_details(draft: &ClaimDraft) -> Vec<FieldError> {
    let mut errors = Vec::new();
    match &draft.selected_flight {
        None => errors.push(FieldError::new("selected_flight", "Select your flight.")),
        Some(flight) => {
            if let Err(err) = flight.validate() {
                errors.push(FieldError {
                    field: "selected_flight".to_string(),
                    message: err.to_string(),
                });
            }
        }
    }
    if draft.answers.is_empty() {
        errors.push(FieldError::new(
            "answers",
            "Answer the assessment questions first.",
        ));
    }
    errors
}

fn trip_experience(draft: &ClaimDraft) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if is_blank(draft.booking_reference.as_deref()) {
        errors.push(FieldError::new(
            "booking_reference",
            "Enter your booking reference.",
        ));
    }
    if draft.journey_fact.is_none() {
        errors.push(FieldError::new(
            "journey_fact",
            "Tell us how you continued your journey.",
        ));
    }
    let scenario = classify(&draft.answers);
    if scenario.issue == Some(IssueKind::Cancelled) && scenario.informed_date.is_none() {
        errors.push(FieldError::new(
            "informed_date",
            "Tell us when you learned about the cancellation.",
        ));
    }
    errors
}

fn claim_agreement(draft: &ClaimDraft) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !draft.terms_accepted {
        errors.push(FieldError::new(
            "terms_accepted",
            "Accept the terms and conditions.",
        ));
    }
    if !draft.privacy_accepted {
        errors.push(FieldError::new(
            "privacy_accepted",
            "Accept the privacy policy.",
        ));
    }
    if is_blank(draft.signature.as_deref()) {
        errors.push(FieldError::new("signature", "Sign the assignment contract."));
    }
    errors
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|inner| inner.trim().is_empty()).unwrap_or(true)
}
