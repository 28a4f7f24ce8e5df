use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::validation::PhaseValidation;

/// Ordinal steps of the claim funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Phase {
    InitialAssessment = 1,
    CompensationEstimate = 2,
    FlightDetails = 3,
    TripExperience = 4,
    ClaimAgreement = 5,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::InitialAssessment,
        Phase::CompensationEstimate,
        Phase::FlightDetails,
        Phase::TripExperience,
        Phase::ClaimAgreement,
    ];
    pub const FIRST: Phase = Phase::InitialAssessment;
    pub const LAST: Phase = Phase::ClaimAgreement;

    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|phase| phase.ordinal() == ordinal)
    }

    pub fn next(self) -> Option<Self> {
        Self::from_ordinal(self.ordinal() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.ordinal()
            .checked_sub(1)
            .and_then(Self::from_ordinal)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Phase::InitialAssessment => "initial_assessment",
            Phase::CompensationEstimate => "compensation_estimate",
            Phase::FlightDetails => "flight_details",
            Phase::TripExperience => "trip_experience",
            Phase::ClaimAgreement => "claim_agreement",
        }
    }
}

impl From<Phase> for u8 {
    fn from(value: Phase) -> Self {
        value.ordinal()
    }
}

impl TryFrom<u8> for Phase {
    type Error = UnknownPhase;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_ordinal(value).ok_or(UnknownPhase(value))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no funnel phase with ordinal {0}")]
pub struct UnknownPhase(pub u8);

/// Terminal screens reached after submission. Mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    Submitted,
    Success,
    Rejected,
}

/// Funnel progress as persisted between visits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseState {
    pub current_phase: Phase,
    pub completed_phases: BTreeSet<Phase>,
    #[serde(default)]
    pub per_phase_validation: BTreeMap<Phase, PhaseValidation>,
    #[serde(default)]
    pub interacted: BTreeSet<Phase>,
    #[serde(default)]
    pub outcome: Option<ClaimOutcome>,
    #[serde(default)]
    pub locale: Option<String>,
}

impl Default for PhaseState {
    fn default() -> Self {
        Self {
            current_phase: Phase::FIRST,
            completed_phases: BTreeSet::new(),
            per_phase_validation: BTreeMap::new(),
            interacted: BTreeSet::new(),
            outcome: None,
            locale: None,
        }
    }
}

impl PhaseState {
    pub fn is_complete(&self, phase: Phase) -> bool {
        self.completed_phases.contains(&phase)
    }

    pub fn highest_completed(&self) -> Option<Phase> {
        self.completed_phases.iter().next_back().copied()
    }

    /// Where a returning or misdirected user lands: one past the highest
    /// completed phase, capped at the last phase.
    pub fn resume_phase(&self) -> Phase {
        match self.highest_completed() {
            Some(phase) => phase.next().unwrap_or(Phase::LAST),
            None => Phase::FIRST,
        }
    }

    /// Phases before `phase` that are not yet complete.
    pub fn missing_before(&self, phase: Phase) -> Vec<Phase> {
        Phase::ALL
            .iter()
            .copied()
            .filter(|candidate| *candidate < phase && !self.is_complete(*candidate))
            .collect()
    }

    pub fn validation(&self, phase: Phase) -> Option<&PhaseValidation> {
        self.per_phase_validation.get(&phase)
    }
}
