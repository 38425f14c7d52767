use crate::cli::ServeArgs;
use crate::infra::{seed_roster, AppState, InMemoryAuditLog, LoggingNotifier};
use crate::routes::with_lifecycle_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use practicum::config::AppConfig;
use practicum::error::AppError;
use practicum::lifecycle::{LifecycleEngine, MemoryStore};
use practicum::telemetry;
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

    let store = Arc::new(MemoryStore::new());
    seed_roster(&store);
    let engine = Arc::new(LifecycleEngine::new(
        store,
        Arc::new(LoggingNotifier),
        Arc::new(InMemoryAuditLog::default()),
    ));

    // Catch up on anything that expired while the service was down.
    let today = Utc::now().date_naive();
    match engine.sweep_expired(today, None) {
        Ok(outcome) if outcome.updated > 0 => {
            info!(updated = outcome.updated, "startup expiry sweep");
        }
        Ok(_) => {}
        Err(err) => warn!(%err, "startup expiry sweep failed"),
    }
    if let Err(err) = engine.remind_expiring(today, config.lifecycle.reminder_horizon_days, None) {
        warn!(%err, "startup reminder pass failed");
    }

    let app = with_lifecycle_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "internship lifecycle service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
