use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{FlightLeg, IataCode};
use super::progress::{ClaimDraft, PhaseAction, ProgressStore};
use super::service::{ClaimService, ClaimServiceError, EstimateRequest};
use super::session::ClaimSessions;
use super::submission::{
    ClaimEvaluationOutcome, ClaimEvaluationRequest, ClaimOrderDraft, SubmissionOutcome,
};
use super::upstream::ClaimsGateway;

/// Shared handler state: the claim service plus per-visitor sessions.
pub struct ClaimApi<G, S> {
    pub service: Arc<ClaimService<G>>,
    pub sessions: Arc<ClaimSessions<S>>,
}

/// Router builder exposing the claim funnel endpoints.
pub fn claim_router<G, S>(service: Arc<ClaimService<G>>, sessions: Arc<ClaimSessions<S>>) -> Router
where
    G: ClaimsGateway + 'static,
    S: ProgressStore + 'static,
{
    let state = Arc::new(ClaimApi { service, sessions });
    Router::new()
        .route("/api/v1/compensation", get(compensation_handler::<G, S>))
        .route("/api/v1/airports", get(airports_handler::<G, S>))
        .route("/api/v1/claims/estimate", post(estimate_handler::<G, S>))
        .route("/api/v1/claims/evaluate", post(evaluate_handler::<G, S>))
        .route("/api/v1/claims/orders", post(order_handler::<G, S>))
        .route("/api/v1/progress/:session", get(progress_handler::<G, S>))
        .route(
            "/api/v1/progress/:session/actions",
            post(progress_action_handler::<G, S>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct RouteQuery {
    from_iata: String,
    to_iata: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AirportQuery {
    #[serde(default)]
    term: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EstimateQuery {
    session: Option<String>,
}

/// Evaluation payload, optionally with the flown leg to derive the delay from.
#[derive(Debug, Deserialize)]
pub(crate) struct EvaluateClaimBody {
    #[serde(flatten)]
    request: ClaimEvaluationRequest,
    #[serde(default)]
    flight: Option<FlightLeg>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressActionRequest {
    action: PhaseAction,
    #[serde(default)]
    draft: ClaimDraft,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({
        "error": message.into(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn compensation_handler<G, S>(
    State(api): State<Arc<ClaimApi<G, S>>>,
    Query(query): Query<RouteQuery>,
) -> Response
where
    G: ClaimsGateway + 'static,
    S: ProgressStore + 'static,
{
    let codes = IataCode::parse(&query.from_iata)
        .and_then(|from| IataCode::parse(&query.to_iata).map(|to| (from, to)));
    match codes {
        Ok((from, to)) => {
            let compensation = api.service.route_compensation(&from, &to).await;
            (StatusCode::OK, axum::Json(compensation)).into_response()
        }
        Err(err) => error_response(StatusCode::BAD_REQUEST, err.to_string()),
    }
}

pub(crate) async fn airports_handler<G, S>(
    State(api): State<Arc<ClaimApi<G, S>>>,
    Query(query): Query<AirportQuery>,
) -> Response
where
    G: ClaimsGateway + 'static,
    S: ProgressStore + 'static,
{
    match api.service.search_airports(&query.term).await {
        Ok(airports) => (StatusCode::OK, axum::Json(airports)).into_response(),
        Err(err) => error_response(StatusCode::BAD_GATEWAY, err.to_string()),
    }
}

pub(crate) async fn estimate_handler<G, S>(
    State(api): State<Arc<ClaimApi<G, S>>>,
    Query(query): Query<EstimateQuery>,
    axum::Json(request): axum::Json<EstimateRequest>,
) -> Response
where
    G: ClaimsGateway + 'static,
    S: ProgressStore + 'static,
{
    let today = Utc::now().date_naive();
    let result = match query.session {
        Some(session) => {
            let coordinator = api.sessions.coordinator(&session);
            api.service
                .estimate_tracked(&coordinator, request, today)
                .await
                .map(|resolution| json!(resolution))
        }
        None => api
            .service
            .estimate(request, today)
            .await
            .map(|verdict| json!(verdict)),
    };

    match result {
        Ok(payload) => (StatusCode::OK, axum::Json(payload)).into_response(),
        Err(ClaimServiceError::InvalidFlight(err)) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
    }
}

pub(crate) async fn evaluate_handler<G, S>(
    State(api): State<Arc<ClaimApi<G, S>>>,
    axum::Json(body): axum::Json<EvaluateClaimBody>,
) -> Response
where
    G: ClaimsGateway + 'static,
    S: ProgressStore + 'static,
{
    let request = match &body.flight {
        Some(leg) => body.request.with_flight_delay(leg),
        None => body.request,
    };
    let outcome = api.service.evaluate(request).await;
    let status = match outcome {
        ClaimEvaluationOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };
    (status, axum::Json(outcome)).into_response()
}

pub(crate) async fn order_handler<G, S>(
    State(api): State<Arc<ClaimApi<G, S>>>,
    axum::Json(draft): axum::Json<ClaimOrderDraft>,
) -> Response
where
    G: ClaimsGateway + 'static,
    S: ProgressStore + 'static,
{
    let outcome = api.service.submit(draft).await;
    let status = match outcome {
        SubmissionOutcome::Submitted { .. } => StatusCode::ACCEPTED,
        SubmissionOutcome::Incomplete { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SubmissionOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
    };
    (status, axum::Json(outcome)).into_response()
}

pub(crate) async fn progress_handler<G, S>(
    State(api): State<Arc<ClaimApi<G, S>>>,
    Path(session): Path<String>,
) -> Response
where
    G: ClaimsGateway + 'static,
    S: ProgressStore + 'static,
{
    match api.sessions.load(&session) {
        Ok(state) => (StatusCode::OK, axum::Json(state)).into_response(),
        Err(err) => error_response(StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
    }
}

pub(crate) async fn progress_action_handler<G, S>(
    State(api): State<Arc<ClaimApi<G, S>>>,
    Path(session): Path<String>,
    axum::Json(request): axum::Json<ProgressActionRequest>,
) -> Response
where
    G: ClaimsGateway + 'static,
    S: ProgressStore + 'static,
{
    match api.sessions.apply(&session, request.action, &request.draft) {
        Ok((event, state)) => {
            let payload = json!({
                "event": event,
                "state": state,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
    }
}
