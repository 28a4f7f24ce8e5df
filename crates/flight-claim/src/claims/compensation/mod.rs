mod classifier;
mod config;
mod policy;
mod table;

pub use classifier::{
    classify, ClaimScenario, DelayBucket, InformedDate, IssueKind, NoticeBucket,
    DELAY_QUESTION_ID, INFORMED_DATE_QUESTION_ID, ISSUE_QUESTION_IDS, NOTICE_QUESTION_ID,
};
pub use config::CompensationConfig;
pub use policy::ReasonCode;
pub use table::{lookup_base_amount, LONG_HAUL_AMOUNT, MEDIUM_HAUL_AMOUNT, SHORT_HAUL_AMOUNT};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::FlightLeg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "EUR")]
    Eur,
}

/// Result of the live route lookup, as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseAmountQuote {
    /// No live lookup was attempted; the distance table decides.
    NotRequested,
    /// The claims API answered with a numeric amount.
    Upstream(u32),
    /// The lookup failed, timed out or returned garbage.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountBasis {
    Upstream,
    DistanceTable,
    Fallback,
}

/// Pre-submission compensation estimate. The claims API's own evaluation at
/// submission time is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationVerdict {
    pub eligible: bool,
    pub amount: u32,
    pub currency: Currency,
    pub reduction_factor: f64,
    pub reason: ReasonCode,
    pub base_amount: u32,
    pub basis: AmountBasis,
    pub fallback: bool,
}

impl CompensationVerdict {
    pub fn summary(&self) -> String {
        if self.eligible {
            format!("eligible for {} EUR: {}", self.amount, self.reason.summary())
        } else {
            format!("not eligible: {}", self.reason.summary())
        }
    }
}

/// Stateless engine applying the rule table to a scenario and flight.
#[derive(Debug, Clone, Default)]
pub struct CompensationEngine {
    config: CompensationConfig,
}

impl CompensationEngine {
    pub fn new(config: CompensationConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &CompensationConfig {
        &self.config
    }

    /// Resolve the base amount: live figure first, configured fallback when the
    /// lookup failed, distance table when none was attempted.
    pub fn base_amount(
        &self,
        distance_km: Option<f64>,
        quote: BaseAmountQuote,
    ) -> (u32, AmountBasis) {
        match quote {
            BaseAmountQuote::Upstream(amount) => (amount, AmountBasis::Upstream),
            BaseAmountQuote::Unavailable => (self.config.fallback_amount, AmountBasis::Fallback),
            BaseAmountQuote::NotRequested => (
                lookup_base_amount(distance_km.unwrap_or(f64::NAN)),
                AmountBasis::DistanceTable,
            ),
        }
    }

    pub fn evaluate(
        &self,
        scenario: &ClaimScenario,
        flight: &FlightLeg,
        quote: BaseAmountQuote,
        today: NaiveDate,
    ) -> CompensationVerdict {
        self.evaluate_distance(scenario, flight.distance_km, quote, today)
    }

    /// Same as [`CompensationEngine::evaluate`] when only the distance is known.
    pub fn evaluate_distance(
        &self,
        scenario: &ClaimScenario,
        distance_km: Option<f64>,
        quote: BaseAmountQuote,
        today: NaiveDate,
    ) -> CompensationVerdict {
        let outcome = policy::decide(scenario, &self.config, today);
        let (base_amount, basis) = self.base_amount(distance_km, quote);

        let amount = if !outcome.eligible {
            0
        } else if outcome.reduction_factor < 1.0 {
            (f64::from(base_amount) * outcome.reduction_factor).floor() as u32
        } else {
            base_amount
        };

        CompensationVerdict {
            eligible: outcome.eligible,
            amount,
            currency: Currency::Eur,
            reduction_factor: outcome.reduction_factor,
            reason: outcome.reason,
            base_amount,
            basis,
            fallback: basis == AmountBasis::Fallback,
        }
    }
}
