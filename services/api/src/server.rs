use crate::cli::ServeArgs;
use crate::infra::{AppState, OutboxNotifier};
use crate::routes::with_referral_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use scope_triage::config::AppConfig;
use scope_triage::error::AppError;
use scope_triage::telemetry;
use scope_triage::workflows::referral::ReferralService;
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

    if !config.notifications.is_configured() {
        warn!("NOTIFY_SENDER/NOTIFY_RECIPIENT unset; referral notifications will report failure");
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    // Long-running server: log queued mail, keep no bodies in memory.
    let notifier = Arc::new(OutboxNotifier::new(config.notifications.clone()).with_retention(0));
    let referral_service = Arc::new(
        ReferralService::new(notifier, config.triage.clone())
            .with_ledger_capacity(config.notifications.ledger_capacity),
    );

    let app = with_referral_routes(referral_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        policy = ?config.triage.fitness_policy,
        %addr,
        "referral triage service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
