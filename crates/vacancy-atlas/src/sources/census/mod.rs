//! Census Bureau adapter: ACS tables for counts, TIGERweb for boundaries.

mod acs;
mod geojson;
mod tiger;

pub use acs::{decode_places, decode_statistics};
pub use geojson::{decode_boundaries, decode_boundary_page, BoundaryPage};

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::{DataSource, SourceError};
use crate::atlas::{BoundaryRecord, GeographyLevel, PlaceOption, SelectionPath, StatisticRecord};
use crate::config::CensusConfig;

/// Upper bound on `resultOffset` round trips for one boundary layer.
const MAX_BOUNDARY_PAGES: usize = 100;

/// Blocking client for the public census services. Call it from a blocking
/// context (`spawn_blocking` inside an async runtime).
#[derive(Debug, Clone)]
pub struct CensusDataSource {
    config: CensusConfig,
}

impl CensusDataSource {
    pub fn new(config: CensusConfig) -> Self {
        Self { config }
    }

    fn map_error<E: std::fmt::Display>(err: E) -> SourceError {
        SourceError::Network(err.to_string())
    }

    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Vec<u8>, SourceError> {
        let client = Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(Self::map_error)?;

        let response = client
            .get(url)
            .query(query)
            .send()
            .map_err(Self::map_error)?;

        let status = response.status();
        debug!(%url, %status, "census response");
        if status == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(SourceError::Network(format!("{url} responded with {status}")));
        }

        response
            .bytes()
            .map(|body| body.to_vec())
            .map_err(Self::map_error)
    }

    fn acs_query(
        &self,
        fields: &str,
        geography: Vec<(&'static str, String)>,
    ) -> Result<Vec<u8>, SourceError> {
        let mut query = vec![("get", fields.to_string())];
        query.extend(geography);
        if let Some(key) = &self.config.api_key {
            query.push(("key", key.clone()));
        }
        self.get(&self.config.acs_url, &query)
    }
}

impl DataSource for CensusDataSource {
    fn fetch_boundaries(
        &self,
        level: GeographyLevel,
        path: &SelectionPath,
    ) -> Result<Vec<BoundaryRecord>, SourceError> {
        let filter =
            tiger::where_clause(level, path).ok_or(SourceError::IncompleteScope(level))?;
        let url = format!(
            "{}/{}/query",
            self.config.tiger_url.trim_end_matches('/'),
            tiger::layer_path(level)
        );

        let mut records = Vec::new();
        for page_number in 1..=MAX_BOUNDARY_PAGES {
            let query = [
                ("where", filter.clone()),
                ("outFields", "*".to_string()),
                ("f", "geojson".to_string()),
                ("resultOffset", records.len().to_string()),
            ];

            let body = self.get(&url, &query)?;
            let page = geojson::decode_boundary_page(&body)?;
            let received = page.records.len();
            records.extend(page.records);

            if !page.exceeded_transfer_limit {
                return Ok(records);
            }
            if received == 0 {
                warn!(
                    %level,
                    features = records.len(),
                    "boundary service stalled while paging"
                );
                return Ok(records);
            }
            debug!(%level, page_number, features = records.len(), "fetching next boundary page");
        }

        warn!(
            %level,
            features = records.len(),
            max_pages = MAX_BOUNDARY_PAGES,
            "boundary layer truncated at the page limit"
        );
        Ok(records)
    }

    fn fetch_statistics(
        &self,
        level: GeographyLevel,
        path: &SelectionPath,
    ) -> Result<Vec<StatisticRecord>, SourceError> {
        let geography =
            acs::geography_params(level, path).ok_or(SourceError::IncompleteScope(level))?;
        let fields = format!(
            "NAME,{},{}",
            self.config.total_variable, self.config.vacant_variable
        );

        let body = self.acs_query(&fields, geography)?;
        acs::decode_statistics(
            &body,
            &self.config.total_variable,
            &self.config.vacant_variable,
        )
    }

    fn fetch_state_list(&self) -> Result<Vec<PlaceOption>, SourceError> {
        let geography = acs::geography_params(GeographyLevel::State, &SelectionPath::national())
            .ok_or(SourceError::IncompleteScope(GeographyLevel::State))?;
        let body = self.acs_query("NAME", geography)?;
        acs::decode_places(&body, GeographyLevel::State)
    }

    fn fetch_county_list(&self, state_id: &str) -> Result<Vec<PlaceOption>, SourceError> {
        let geography = vec![
            ("for", format!("{}:*", acs::predicate(GeographyLevel::County))),
            ("in", format!("state:{}", state_id.trim())),
        ];
        let body = self.acs_query("NAME", geography)?;
        acs::decode_places(&body, GeographyLevel::County)
    }
}
