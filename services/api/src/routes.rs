use crate::infra::{query_layer, run_blocking, AppState};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use vacancy_atlas::atlas::report::views::{RegionRow, SummaryView};
use vacancy_atlas::atlas::{
    GeographyLevel, HierarchyNavigator, LegendEntry, PlaceOption, QueryScope, RateCalculator,
    DEFAULT_TOP_REGIONS,
};
use vacancy_atlas::error::AppError;

#[derive(Debug, Deserialize)]
pub(crate) struct AtlasQueryRequest {
    pub(crate) level: String,
    #[serde(default)]
    pub(crate) state: Option<String>,
    #[serde(default)]
    pub(crate) county: Option<String>,
    #[serde(default)]
    pub(crate) top: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AtlasQueryResponse {
    pub(crate) scope: QueryScope,
    pub(crate) fetched_at: DateTime<Utc>,
    pub(crate) summary: SummaryView,
    pub(crate) regions: Vec<RegionRow>,
}

pub(crate) fn atlas_router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/atlas/palette", get(palette_endpoint))
        .route("/api/v1/atlas/states", get(states_endpoint))
        .route("/api/v1/atlas/states/:state/counties", get(counties_endpoint))
        .route("/api/v1/atlas/query", post(query_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn palette_endpoint() -> Json<Vec<LegendEntry>> {
    Json(RateCalculator::palette())
}

pub(crate) async fn states_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<PlaceOption>>, AppError> {
    let source = state.source.clone();
    let places = run_blocking(move || Ok(source.fetch_state_list()?)).await?;
    Ok(Json(places))
}

pub(crate) async fn counties_endpoint(
    Extension(state): Extension<AppState>,
    Path(state_id): Path<String>,
) -> Result<Json<Vec<PlaceOption>>, AppError> {
    let source = state.source.clone();
    let places = run_blocking(move || Ok(source.fetch_county_list(&state_id)?)).await?;
    Ok(Json(places))
}

pub(crate) async fn query_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<AtlasQueryRequest>,
) -> Result<Json<AtlasQueryResponse>, AppError> {
    let AtlasQueryRequest {
        level,
        state: state_id,
        county,
        top,
    } = payload;

    let level: GeographyLevel = level.parse()?;
    let navigator = HierarchyNavigator::at(level, state_id.as_deref(), county.as_deref())?;
    let snapshot = query_layer(state.source.clone(), navigator).await?;

    info!(scope = %snapshot.scope, regions = snapshot.regions.len(), "atlas query served");

    let summary = snapshot.summary.view(top.unwrap_or(DEFAULT_TOP_REGIONS));
    let regions = snapshot.regions.iter().map(RegionRow::from_region).collect();

    Ok(Json(AtlasQueryResponse {
        scope: snapshot.scope,
        fetched_at: snapshot.fetched_at,
        summary,
        regions,
    }))
}
