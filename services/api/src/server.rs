use crate::cli::ServeArgs;
use crate::infra::{language_store, AppState, InMemorySessionRepository};
use crate::routes::with_application_routes;
use admissions::catalog::ProgramCatalog;
use admissions::config::AppConfig;
use admissions::error::AppError;
use admissions::telemetry;
use admissions::workflows::application::{AdmissionsService, MockSubmissionBackend};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
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
    let catalog = Arc::new(ProgramCatalog::embedded().clone());
    let language = language_store(&config.language);
    info!(language = %language.current(), "language store loaded");

    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        language,
        catalog: catalog.clone(),
    };

    let admissions_service = Arc::new(AdmissionsService::new(
        Arc::new(InMemorySessionRepository::default()),
        Arc::new(MockSubmissionBackend::new(config.submission.delay)),
        catalog,
    ));

    let app = with_application_routes(admissions_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "admissions service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
