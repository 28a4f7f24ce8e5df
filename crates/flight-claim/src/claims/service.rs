use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::compensation::{
    classify, BaseAmountQuote, CompensationConfig, CompensationEngine, CompensationVerdict,
    Currency,
};
use super::domain::{Airport, AirportSelection, FlightLeg, FlightLegError, IataCode, WizardAnswer};
use super::estimate::{EstimateCoordinator, EstimateResolution};
use super::submission::{
    ClaimEvaluationOutcome, ClaimEvaluationRequest, ClaimOrderDraft, SubmissionOutcome,
};
use super::upstream::{ClaimsGateway, UpstreamError};

/// Inputs for a pre-submission estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    #[serde(default)]
    pub answers: Vec<WizardAnswer>,
    pub flight: FlightLeg,
    #[serde(default)]
    pub origin: AirportSelection,
    #[serde(default)]
    pub destination: AirportSelection,
    /// Ask the claims API for the route amount instead of using the distance table.
    #[serde(default)]
    pub live_lookup: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteCompensation {
    pub amount: u32,
    pub currency: Currency,
    pub fallback: bool,
}

/// Service composing the compensation engine with the claims API gateway.
pub struct ClaimService<G> {
    gateway: Arc<G>,
    engine: Arc<CompensationEngine>,
}

impl<G> ClaimService<G>
where
    G: ClaimsGateway + 'static,
{
    pub fn new(gateway: Arc<G>, config: CompensationConfig) -> Self {
        Self {
            gateway,
            engine: Arc::new(CompensationEngine::new(config)),
        }
    }

    pub fn engine(&self) -> &CompensationEngine {
        &self.engine
    }

    /// Live route amount. Every failure is logged and reported as unavailable.
    pub async fn base_quote(&self, from: &IataCode, to: &IataCode) -> BaseAmountQuote {
        match self.gateway.compensation_for_route(from, to).await {
            Ok(amount) => BaseAmountQuote::Upstream(amount),
            Err(err) => {
                warn!(
                    from = %from,
                    to = %to,
                    status = err.status(),
                    error = %err,
                    "compensation lookup failed; using fallback amount"
                );
                BaseAmountQuote::Unavailable
            }
        }
    }

    pub async fn route_compensation(&self, from: &IataCode, to: &IataCode) -> RouteCompensation {
        let (amount, fallback) = match self.base_quote(from, to).await {
            BaseAmountQuote::Upstream(amount) => (amount, false),
            _ => (self.engine.config().fallback_amount, true),
        };
        RouteCompensation {
            amount,
            currency: Currency::Eur,
            fallback,
        }
    }

    pub async fn estimate(
        &self,
        request: EstimateRequest,
        today: NaiveDate,
    ) -> Result<CompensationVerdict, ClaimServiceError> {
        let EstimateRequest {
            answers,
            mut flight,
            origin,
            destination,
            live_lookup,
        } = request;

        flight.resolve_distance(&origin, &destination);
        flight.validate()?;

        let scenario = classify(&answers);
        let quote = if live_lookup {
            self.base_quote(&flight.origin, &flight.destination).await
        } else {
            BaseAmountQuote::NotRequested
        };

        Ok(self.engine.evaluate(&scenario, &flight, quote, today))
    }

    /// Estimate under a coordinator ticket; a newer estimate started meanwhile wins.
    pub async fn estimate_tracked(
        &self,
        coordinator: &EstimateCoordinator,
        request: EstimateRequest,
        today: NaiveDate,
    ) -> Result<EstimateResolution, ClaimServiceError> {
        let ticket = coordinator.begin();
        let verdict = self.estimate(request, today).await?;
        Ok(coordinator.resolve(ticket, verdict))
    }

    pub async fn search_airports(&self, term: &str) -> Result<Vec<Airport>, UpstreamError> {
        self.gateway.search_airports(term).await
    }

    pub async fn evaluate(&self, request: ClaimEvaluationRequest) -> ClaimEvaluationOutcome {
        match self.gateway.evaluate_claim(&request).await {
            Ok(evaluation) => evaluation.into(),
            Err(err) => {
                warn!(status = err.status(), error = %err, "claim evaluation failed");
                ClaimEvaluationOutcome::Failed {
                    status: err.status(),
                    message: err.to_string(),
                }
            }
        }
    }

    /// Validate locally, then transmit. Incomplete drafts never reach the claims API.
    pub async fn submit(&self, draft: ClaimOrderDraft) -> SubmissionOutcome {
        let order = match draft.validate() {
            Ok(order) => order,
            Err(missing) => {
                warn!(missing = ?missing.0, "claim order rejected before transmission");
                return SubmissionOutcome::Incomplete {
                    missing_fields: missing.0,
                };
            }
        };

        match self.gateway.submit_order(&order).await {
            Ok(receipt) => SubmissionOutcome::Submitted { receipt },
            Err(err) => {
                warn!(status = err.status(), error = %err, "claim order transmission failed");
                SubmissionOutcome::Failed {
                    status: err.status(),
                    message: err.to_string(),
                }
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClaimServiceError {
    #[error(transparent)]
    InvalidFlight(#[from] FlightLegError),
}
