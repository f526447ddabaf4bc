pub mod census;

use std::fmt::Debug;

use crate::atlas::{BoundaryRecord, GeographyLevel, PlaceOption, SelectionPath, StatisticRecord};

pub use census::CensusDataSource;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("data source unreachable: {0}")]
    Network(String),
    #[error("data source returned unreadable data: {0}")]
    Decode(String),
    #[error("{0} query is missing its parent selection")]
    IncompleteScope(GeographyLevel),
}

/// Provider of boundary geometry, statistics rows and place lists for a scope.
///
/// State-level queries cover every state regardless of the selected state;
/// finer levels are restricted to the selected parents.
pub trait DataSource: Debug + Send + Sync {
    fn fetch_boundaries(
        &self,
        level: GeographyLevel,
        path: &SelectionPath,
    ) -> Result<Vec<BoundaryRecord>, SourceError>;

    fn fetch_statistics(
        &self,
        level: GeographyLevel,
        path: &SelectionPath,
    ) -> Result<Vec<StatisticRecord>, SourceError>;

    fn fetch_state_list(&self) -> Result<Vec<PlaceOption>, SourceError>;

    fn fetch_county_list(&self, state_id: &str) -> Result<Vec<PlaceOption>, SourceError>;
}
