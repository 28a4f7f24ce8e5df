use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::claims::domain::{Airport, AirportSelection, FlightLeg, IataCode, WizardAnswer};
use crate::claims::progress::{ClaimDraft, PhaseMachine, ProgressStore, ProgressStoreError};
use crate::claims::submission::{
    ClaimEvaluation, ClaimEvaluationRequest, ClaimOrder, ClaimOrderDraft, EvaluationStatus,
    JourneyFactType, OrderReceipt, Salutation,
};
use crate::claims::upstream::{ClaimsGateway, UpstreamError};
use crate::claims::{claim_router, ClaimService, ClaimSessions, CompensationConfig};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
}

pub(super) fn iata(code: &str) -> IataCode {
    IataCode::parse(code).expect("valid iata code")
}

pub(super) fn airport(code: &str, lat: f64, lng: f64) -> Airport {
    Airport {
        iata_code: iata(code),
        name: format!("{code} International"),
        lat,
        lng,
    }
}

pub(super) fn flight(from: &str, to: &str, distance_km: Option<f64>) -> FlightLeg {
    FlightLeg {
        flight_id: Some("LH400-20261001".to_string()),
        origin: iata(from),
        destination: iata(to),
        scheduled_departure: Utc
            .with_ymd_and_hms(2026, 10, 1, 10, 0, 0)
            .single()
            .expect("valid timestamp"),
        scheduled_arrival: Utc
            .with_ymd_and_hms(2026, 10, 1, 13, 0, 0)
            .single()
            .expect("valid timestamp"),
        actual_departure: None,
        actual_arrival: None,
        distance_km,
        carrier: "LH".to_string(),
    }
}

pub(super) fn answers(pairs: &[(&str, &str)]) -> Vec<WizardAnswer> {
    pairs
        .iter()
        .map(|(question, value)| WizardAnswer::new(*question, *value))
        .collect()
}

/// Draft that satisfies every phase predicate.
pub(super) fn complete_draft() -> ClaimDraft {
    ClaimDraft {
        answers: answers(&[
            ("what_happened", "cancelled"),
            ("cancellation_notice", "0-7_days"),
            ("informed_date", "2026-09-28"),
        ]),
        origin: AirportSelection::Code {
            iata_code: iata("FRA"),
        },
        destination: AirportSelection::Code {
            iata_code: iata("MAD"),
        },
        selected_flight: Some(flight("FRA", "MAD", Some(1420.0))),
        booking_reference: Some("ABC123".to_string()),
        journey_fact: Some(JourneyFactType::SelfArranged),
        terms_accepted: true,
        privacy_accepted: true,
        signature: Some("data:image/png;base64,iVBORw0".to_string()),
    }
}

pub(super) fn order_draft() -> ClaimOrderDraft {
    ClaimOrderDraft {
        booked_flight_ids: vec!["LH400-20261001".to_string()],
        actual_flight_ids: vec!["LH402-20261001".to_string()],
        information_received_date: Some("2026-09-28".to_string()),
        booking_reference: Some("ABC123".to_string()),
        journey_fact_type: Some(JourneyFactType::Provided),
        salutation: Some(Salutation::Mrs),
        first_name: Some("Erika".to_string()),
        last_name: Some("Mustermann".to_string()),
        street: Some("Hauptstrasse 1".to_string()),
        postal_code: Some("60311".to_string()),
        city: Some("Frankfurt".to_string()),
        country: Some(" de ".to_string()),
        email: Some("erika@example.org".to_string()),
        marketable_status: Some(false),
        contract_signature: Some("data:image/png;base64,iVBORw0".to_string()),
        terms_accepted: Some(true),
        data_processing_consent: Some(true),
    }
}

/// Scriptable [`ClaimsGateway`] recording what it was asked.
pub(super) struct StubGateway {
    compensation: Result<u32, UpstreamError>,
    airports: Result<Vec<Airport>, UpstreamError>,
    evaluation: Result<ClaimEvaluation, UpstreamError>,
    receipt: Result<OrderReceipt, UpstreamError>,
    slow_origin: Option<(String, Duration)>,
    compensation_calls: AtomicUsize,
    evaluations: Mutex<Vec<ClaimEvaluationRequest>>,
    orders: Mutex<Vec<ClaimOrder>>,
}

impl Default for StubGateway {
    fn default() -> Self {
        Self {
            compensation: Ok(600),
            airports: Ok(vec![airport("FRA", 50.0379, 8.5622)]),
            evaluation: Ok(ClaimEvaluation {
                status: EvaluationStatus::Accept,
                contract_amount: Some(400.0),
            }),
            receipt: Ok(OrderReceipt {
                order_id: Some("ord-1001".to_string()),
                status: Some("received".to_string()),
            }),
            slow_origin: None,
            compensation_calls: AtomicUsize::new(0),
            evaluations: Mutex::new(Vec::new()),
            orders: Mutex::new(Vec::new()),
        }
    }
}

impl StubGateway {
    pub(super) fn failing() -> Self {
        let outage = UpstreamError::Status {
            status: 500,
            message: "internal error".to_string(),
        };
        Self {
            compensation: Err(outage.clone()),
            airports: Err(outage.clone()),
            evaluation: Err(outage.clone()),
            receipt: Err(outage),
            ..Self::default()
        }
    }

    pub(super) fn with_compensation(mut self, result: Result<u32, UpstreamError>) -> Self {
        self.compensation = result;
        self
    }

    pub(super) fn with_receipt(mut self, result: Result<OrderReceipt, UpstreamError>) -> Self {
        self.receipt = result;
        self
    }

    pub(super) fn with_slow_origin(mut self, origin: &str, delay: Duration) -> Self {
        self.slow_origin = Some((origin.to_string(), delay));
        self
    }

    pub(super) fn compensation_calls(&self) -> usize {
        self.compensation_calls.load(Ordering::SeqCst)
    }

    pub(super) fn evaluations(&self) -> Vec<ClaimEvaluationRequest> {
        self.evaluations
            .lock()
            .expect("evaluations mutex poisoned")
            .clone()
    }

    pub(super) fn orders(&self) -> Vec<ClaimOrder> {
        self.orders.lock().expect("orders mutex poisoned").clone()
    }
}

#[async_trait]
impl ClaimsGateway for StubGateway {
    async fn compensation_for_route(
        &self,
        from: &IataCode,
        _to: &IataCode,
    ) -> Result<u32, UpstreamError> {
        self.compensation_calls.fetch_add(1, Ordering::SeqCst);
        if let Some((origin, delay)) = &self.slow_origin {
            if origin == from.as_str() {
                tokio::time::sleep(*delay).await;
            }
        }
        self.compensation.clone()
    }

    async fn search_airports(&self, _term: &str) -> Result<Vec<Airport>, UpstreamError> {
        self.airports.clone()
    }

    async fn evaluate_claim(
        &self,
        request: &ClaimEvaluationRequest,
    ) -> Result<ClaimEvaluation, UpstreamError> {
        self.evaluations
            .lock()
            .expect("evaluations mutex poisoned")
            .push(request.clone());
        self.evaluation.clone()
    }

    async fn submit_order(&self, order: &ClaimOrder) -> Result<OrderReceipt, UpstreamError> {
        self.orders
            .lock()
            .expect("orders mutex poisoned")
            .push(order.clone());
        self.receipt.clone()
    }
}

#[derive(Default)]
pub(super) struct MemoryProgressStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryProgressStore {
    pub(super) fn insert_raw(&self, key: &str, blob: &str) {
        self.blobs
            .lock()
            .expect("store mutex poisoned")
            .insert(key.to_string(), blob.to_string());
    }

    pub(super) fn raw(&self, key: &str) -> Option<String> {
        self.blobs
            .lock()
            .expect("store mutex poisoned")
            .get(key)
            .cloned()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn read(&self, key: &str) -> Result<Option<String>, ProgressStoreError> {
        Ok(self.raw(key))
    }

    fn write(&self, key: &str, blob: String) -> Result<(), ProgressStoreError> {
        self.blobs
            .lock()
            .expect("store mutex poisoned")
            .insert(key.to_string(), blob);
        Ok(())
    }
}

/// Memory store whose reads take `delay`, widening any read-modify-write window.
pub(super) struct SlowReadStore {
    inner: MemoryProgressStore,
    delay: Duration,
}

impl SlowReadStore {
    pub(super) fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryProgressStore::default(),
            delay,
        }
    }
}

impl ProgressStore for SlowReadStore {
    fn read(&self, key: &str) -> Result<Option<String>, ProgressStoreError> {
        std::thread::sleep(self.delay);
        self.inner.read(key)
    }

    fn write(&self, key: &str, blob: String) -> Result<(), ProgressStoreError> {
        self.inner.write(key, blob)
    }
}

pub(super) struct UnavailableStore;

impl ProgressStore for UnavailableStore {
    fn read(&self, _key: &str) -> Result<Option<String>, ProgressStoreError> {
        Err(ProgressStoreError::Unavailable("storage offline".to_string()))
    }

    fn write(&self, _key: &str, _blob: String) -> Result<(), ProgressStoreError> {
        Err(ProgressStoreError::Unavailable("storage offline".to_string()))
    }
}

pub(super) fn build_service(gateway: StubGateway) -> (ClaimService<StubGateway>, Arc<StubGateway>) {
    let gateway = Arc::new(gateway);
    let service = ClaimService::new(gateway.clone(), CompensationConfig::default());
    (service, gateway)
}

pub(super) fn router_with<S>(gateway: StubGateway, store: Arc<S>) -> (axum::Router, Arc<StubGateway>)
where
    S: ProgressStore + 'static,
{
    let (service, gateway) = build_service(gateway);
    let sessions = ClaimSessions::new(store, PhaseMachine::new());
    (claim_router(Arc::new(service), Arc::new(sessions)), gateway)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
