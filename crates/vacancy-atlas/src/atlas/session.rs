use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::domain::{BoundaryRecord, GeographyLevel, QueryScope, RegionStat, StatisticRecord};
use super::join::GeoJoinEngine;
use super::navigator::{HierarchyNavigator, NavigationError, QueryTicket};
use super::report::{AggregateSummary, SummaryAggregator};
use crate::sources::{DataSource, SourceError};

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("result for '{requested}' arrived after the selection moved to '{current}'")]
    Stale {
        requested: QueryScope,
        current: QueryScope,
    },
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Raw data fetched for one ticket, not yet joined.
#[derive(Debug, Clone)]
pub struct FetchedLayer {
    pub boundaries: Vec<BoundaryRecord>,
    pub statistics: Vec<StatisticRecord>,
    pub fetched_at: DateTime<Utc>,
}

/// The joined regions and summary for one completed query.
#[derive(Debug, Clone, Serialize)]
pub struct LayerSnapshot {
    pub scope: QueryScope,
    pub fetched_at: DateTime<Utc>,
    pub regions: Vec<RegionStat>,
    pub summary: AggregateSummary,
}

impl LayerSnapshot {
    pub fn build(scope: QueryScope, fetched: FetchedLayer) -> Self {
        let regions = GeoJoinEngine::join(scope.level, &fetched.boundaries, &fetched.statistics);
        let summary = SummaryAggregator::summarize(&regions);
        Self {
            scope,
            fetched_at: fetched.fetched_at,
            regions,
            summary,
        }
    }
}

/// Pairs the navigator with a data source and keeps the last good layer.
///
/// A query is `begin_query` → `fetch` → `complete`. Completion is refused when the
/// selection changed after the ticket was issued, and any failure leaves the
/// previous snapshot in place.
#[derive(Debug)]
pub struct AtlasSession {
    source: Arc<dyn DataSource>,
    navigator: HierarchyNavigator,
    current: Option<LayerSnapshot>,
}

impl AtlasSession {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self::with_navigator(source, HierarchyNavigator::new())
    }

    pub fn with_navigator(source: Arc<dyn DataSource>, navigator: HierarchyNavigator) -> Self {
        Self {
            source,
            navigator,
            current: None,
        }
    }

    pub fn navigator(&self) -> &HierarchyNavigator {
        &self.navigator
    }

    pub fn current(&self) -> Option<&LayerSnapshot> {
        self.current.as_ref()
    }

    pub fn select_state(&mut self, state_id: &str) -> Result<QueryTicket, NavigationError> {
        self.navigator.select_state(state_id)?;
        Ok(self.begin_query())
    }

    pub fn select_county(&mut self, county_id: &str) -> Result<QueryTicket, NavigationError> {
        self.navigator.select_county(county_id)?;
        Ok(self.begin_query())
    }

    pub fn select_county_at(
        &mut self,
        county_id: &str,
        level: GeographyLevel,
    ) -> Result<QueryTicket, NavigationError> {
        self.navigator.select_county_at(county_id, level)?;
        Ok(self.begin_query())
    }

    pub fn select_level(&mut self, level: GeographyLevel) -> Result<QueryTicket, NavigationError> {
        self.navigator.select_level(level)?;
        Ok(self.begin_query())
    }

    pub fn reset(&mut self) -> QueryTicket {
        self.navigator.reset();
        self.begin_query()
    }

    pub fn begin_query(&self) -> QueryTicket {
        self.navigator.ticket()
    }

    /// Fetches boundaries and statistics for the ticket's scope. Not retried.
    pub fn fetch(&self, ticket: &QueryTicket) -> Result<FetchedLayer, SourceError> {
        fetch_layer(self.source.as_ref(), &ticket.scope)
    }

    pub fn complete(
        &mut self,
        ticket: QueryTicket,
        fetched: FetchedLayer,
    ) -> Result<&LayerSnapshot, QueryError> {
        if !self.navigator.is_current(&ticket) {
            let current = self.navigator.current_scope();
            warn!(requested = %ticket.scope, %current, "discarding stale layer");
            return Err(QueryError::Stale {
                requested: ticket.scope,
                current,
            });
        }

        let snapshot = LayerSnapshot::build(ticket.scope, fetched);
        info!(
            scope = %snapshot.scope,
            regions = snapshot.regions.len(),
            avg_vacancy_rate_pct = snapshot.summary.avg_vacancy_rate_pct,
            "layer ready"
        );
        let snapshot = self.current.insert(snapshot);
        Ok(&*snapshot)
    }

    /// Fetches and completes the active scope in one step.
    pub fn refresh(&mut self) -> Result<&LayerSnapshot, QueryError> {
        let ticket = self.begin_query();
        let fetched = self.fetch(&ticket)?;
        self.complete(ticket, fetched)
    }
}

pub fn fetch_layer(
    source: &dyn DataSource,
    scope: &QueryScope,
) -> Result<FetchedLayer, SourceError> {
    debug!(%scope, "fetching layer");
    let boundaries = source.fetch_boundaries(scope.level, &scope.path)?;
    let statistics = source.fetch_statistics(scope.level, &scope.path)?;
    debug!(
        %scope,
        boundaries = boundaries.len(),
        statistics = statistics.len(),
        "layer fetched"
    );

    Ok(FetchedLayer {
        boundaries,
        statistics,
        fetched_at: Utc::now(),
    })
}
