use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use vacancy_atlas::atlas::{AtlasSession, GeographyLevel, HierarchyNavigator, LayerSnapshot};
use vacancy_atlas::error::AppError;
use vacancy_atlas::sources::DataSource;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) source: Arc<dyn DataSource>,
}

/// Runs data source calls off the async workers; the census client blocks.
pub(crate) async fn run_blocking<T, F>(task: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| AppError::Io(std::io::Error::other(err)))?
}

/// Fetches, joins and summarizes the navigator's current scope.
pub(crate) async fn query_layer(
    source: Arc<dyn DataSource>,
    navigator: HierarchyNavigator,
) -> Result<LayerSnapshot, AppError> {
    run_blocking(move || {
        let mut session = AtlasSession::with_navigator(source, navigator);
        let snapshot = session.refresh()?;
        Ok(snapshot.clone())
    })
    .await
}

pub(crate) fn parse_level(raw: &str) -> Result<GeographyLevel, String> {
    raw.parse::<GeographyLevel>().map_err(|err| err.to_string())
}
