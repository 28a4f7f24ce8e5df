//! Boundary to the external claims-processing API.

mod http;
mod retry;

pub use http::HttpClaimsGateway;
pub use retry::RetryPolicy;

use async_trait::async_trait;

use super::domain::{Airport, IataCode};
use super::submission::{ClaimEvaluation, ClaimEvaluationRequest, ClaimOrder, OrderReceipt};

/// Minimum search term length before the airport search is called.
pub const MIN_AIRPORT_TERM_LEN: usize = 3;

/// Operations the claims domain needs from the claims API.
#[async_trait]
pub trait ClaimsGateway: Send + Sync {
    /// Compensation in whole EUR for a route, as the claims API computes it.
    async fn compensation_for_route(
        &self,
        from: &IataCode,
        to: &IataCode,
    ) -> Result<u32, UpstreamError>;

    async fn search_airports(&self, term: &str) -> Result<Vec<Airport>, UpstreamError>;

    async fn evaluate_claim(
        &self,
        request: &ClaimEvaluationRequest,
    ) -> Result<ClaimEvaluation, UpstreamError>;

    async fn submit_order(&self, order: &ClaimOrder) -> Result<OrderReceipt, UpstreamError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    /// No connection was established, so nothing reached the claims API.
    #[error("claims api refused the connection: {0}")]
    Connect(String),
    #[error("claims api unreachable: {0}")]
    Transport(String),
    #[error("claims api timed out")]
    Timeout,
    #[error("claims api responded {status}: {message}")]
    Status { status: u16, message: String },
    #[error("claims api payload could not be decoded: {0}")]
    Decode(String),
    #[error("claims api client could not be built: {0}")]
    Client(String),
}

impl UpstreamError {
    /// Transport failures, timeouts, throttling and server errors may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Connect(_) | UpstreamError::Transport(_) | UpstreamError::Timeout => {
                true
            }
            UpstreamError::Status { status, .. } => *status >= 500 || *status == 429,
            UpstreamError::Decode(_) | UpstreamError::Client(_) => false,
        }
    }

    /// The request never left the client. Only these failures may be resent
    /// for calls that create something upstream.
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, UpstreamError::Connect(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
