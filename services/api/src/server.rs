use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::atlas_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use vacancy_atlas::config::AppConfig;
use vacancy_atlas::error::AppError;
use vacancy_atlas::sources::CensusDataSource;
use vacancy_atlas::telemetry;

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
        source: Arc::new(CensusDataSource::new(config.census.clone())),
    };

    let app = atlas_router()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        acs_url = %config.census.acs_url,
        "vacancy atlas ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
