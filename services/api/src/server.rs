use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryProgressStore};
use crate::routes::with_claim_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use flight_claim::claims::{
    ClaimService, ClaimSessions, CompensationConfig, HttpClaimsGateway, PhaseMachine,
};
use flight_claim::config::AppConfig;
use flight_claim::error::AppError;
use flight_claim::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let gateway = Arc::new(HttpClaimsGateway::new(&config.upstream)?);
    let claim_service = Arc::new(ClaimService::new(gateway, CompensationConfig::default()));

    let machine = PhaseMachine::with_debug_override(config.progress.debug_override);
    if machine.debug_override() {
        warn!(?config.environment, "phase override enabled; funnel ordering is not enforced");
    } else if config.progress.debug_override {
        warn!("phase override requested but not compiled into this build; ignoring");
    }
    let sessions = Arc::new(ClaimSessions::new(
        Arc::new(InMemoryProgressStore::default()),
        machine,
    ));

    let app = with_claim_routes(claim_service, sessions)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::Bind { addr, source })?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        upstream = %config.upstream.base_url,
        "flight claim service ready"
    );

    axum::serve(listener, app).await.map_err(AppError::Serve)?;
    Ok(())
}
