use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryBookingRepository, LoggingNotificationDispatcher};
use crate::routes::with_scheduling_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use ceremony_scheduling::config::AppConfig;
use ceremony_scheduling::error::AppError;
use ceremony_scheduling::scheduling::SlotAllocationService;
use ceremony_scheduling::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

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

    let repository = Arc::new(InMemoryBookingRepository::default());
    let dispatcher = Arc::new(LoggingNotificationDispatcher::default());
    let allocation_service = Arc::new(SlotAllocationService::new(repository, dispatcher));

    let app = with_scheduling_routes(allocation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "ceremony scheduling service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
