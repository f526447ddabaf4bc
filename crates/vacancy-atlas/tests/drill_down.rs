use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use geo::MultiPolygon;
use serde_json::{Map, Value};
use vacancy_atlas::atlas::{
    AtlasSession, BoundaryRecord, ColorBucket, FetchedLayer, GeographyLevel, PlaceOption,
    QueryError, SelectionPath, StatisticRecord,
};
use vacancy_atlas::sources::{DataSource, SourceError};

type LayerKey = (GeographyLevel, Option<String>, Option<String>);

#[derive(Debug, Default)]
struct FakeSource {
    layers: HashMap<LayerKey, (Vec<BoundaryRecord>, Vec<StatisticRecord>)>,
    failure: Mutex<Option<SourceError>>,
    requests: Mutex<Vec<LayerKey>>,
}

impl FakeSource {
    fn key(level: GeographyLevel, path: &SelectionPath) -> LayerKey {
        let state = path.state().map(str::to_string);
        let county = path.county().map(str::to_string);
        match level {
            GeographyLevel::State => (level, None, None),
            GeographyLevel::County => (level, state, None),
            GeographyLevel::Tract | GeographyLevel::BlockGroup => (level, state, county),
        }
    }

    fn with_layer(
        mut self,
        key: LayerKey,
        boundaries: Vec<BoundaryRecord>,
        statistics: Vec<StatisticRecord>,
    ) -> Self {
        self.layers.insert(key, (boundaries, statistics));
        self
    }

    fn fail_next(&self, error: SourceError) {
        *self.failure.lock().expect("failure mutex") = Some(error);
    }

    fn requests(&self) -> Vec<LayerKey> {
        self.requests.lock().expect("requests mutex").clone()
    }
}

impl DataSource for FakeSource {
    fn fetch_boundaries(
        &self,
        level: GeographyLevel,
        path: &SelectionPath,
    ) -> Result<Vec<BoundaryRecord>, SourceError> {
        if let Some(error) = self.failure.lock().expect("failure mutex").take() {
            return Err(error);
        }
        let key = Self::key(level, path);
        self.requests.lock().expect("requests mutex").push(key.clone());
        Ok(self
            .layers
            .get(&key)
            .map(|(boundaries, _)| boundaries.clone())
            .unwrap_or_default())
    }

    fn fetch_statistics(
        &self,
        level: GeographyLevel,
        path: &SelectionPath,
    ) -> Result<Vec<StatisticRecord>, SourceError> {
        Ok(self
            .layers
            .get(&Self::key(level, path))
            .map(|(_, statistics)| statistics.clone())
            .unwrap_or_default())
    }

    fn fetch_state_list(&self) -> Result<Vec<PlaceOption>, SourceError> {
        Ok(Vec::new())
    }

    fn fetch_county_list(&self, _state_id: &str) -> Result<Vec<PlaceOption>, SourceError> {
        Ok(Vec::new())
    }
}

fn boundary(fields: &[(&str, &str)]) -> BoundaryRecord {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| (key.to_string(), Value::from(*value)))
        .collect();
    BoundaryRecord::new(MultiPolygon::new(Vec::new()), properties)
}

fn statistic(name: &str, components: &[&str], total: u64, vacant: u64) -> StatisticRecord {
    StatisticRecord {
        name: name.to_string(),
        total_units: total,
        vacant_units: vacant,
        geo_components: components.iter().map(|c| c.to_string()).collect(),
    }
}

fn iowa_source() -> FakeSource {
    FakeSource::default()
        .with_layer(
            (GeographyLevel::State, None, None),
            vec![
                boundary(&[("STATE", "19"), ("NAME", "Iowa")]),
                boundary(&[("STATE", "17"), ("NAME", "Illinois")]),
            ],
            vec![
                statistic("Iowa", &["19"], 1_000, 100),
                statistic("Illinois", &["17"], 2_000, 150),
            ],
        )
        .with_layer(
            (GeographyLevel::County, Some("19".into()), None),
            vec![
                boundary(&[("STATE", "19"), ("COUNTY", "153"), ("NAME", "Polk County")]),
                boundary(&[("STATE", "19"), ("COUNTY", "169"), ("NAME", "Story County")]),
            ],
            vec![
                statistic("Polk County, Iowa", &["19", "153"], 200, 13),
                statistic("Story County, Iowa", &["19", "169"], 100, 20),
            ],
        )
        .with_layer(
            (GeographyLevel::Tract, Some("19".into()), Some("153".into())),
            vec![
                boundary(&[("TRACT", "010100"), ("NAME", "Census Tract 101")]),
                boundary(&[("TRACT", "010200"), ("NAME", "Census Tract 102")]),
            ],
            vec![statistic("Census Tract 101", &["19", "153", "010100"], 100, 5)],
        )
        .with_layer(
            (GeographyLevel::BlockGroup, Some("19".into()), Some("153".into())),
            vec![
                boundary(&[("TRACT", "010100"), ("BLKGRP", "1")]),
                boundary(&[("TRACT", "010200"), ("BLKGRP", "1")]),
            ],
            vec![
                statistic("Truncated", &["010100", "1"], 10, 10),
                statistic("Block Group 1, 101", &["19", "153", "010100", "1"], 100, 10),
                statistic("Block Group 1, 102", &["19", "153", "010200", "1"], 300, 90),
            ],
        )
}

fn session_over(source: &Arc<FakeSource>) -> AtlasSession {
    AtlasSession::new(Arc::clone(source) as Arc<dyn DataSource>)
}

#[test]
fn drill_down_from_states_to_tracts() {
    let source = Arc::new(iowa_source());
    let mut session = session_over(&source);

    let states = session.refresh().expect("state layer loads");
    assert_eq!(states.scope.level, GeographyLevel::State);
    assert_eq!(states.regions.len(), 2);
    assert_eq!(states.summary.total_vacant_units, 250);
    assert_eq!(states.summary.avg_vacancy_rate_pct, 8.3);
    assert_eq!(states.summary.ranked_regions[0].name, "Iowa");

    session.select_state("19").expect("state selected");
    session
        .select_level(GeographyLevel::County)
        .expect("county level");
    let counties = session.refresh().expect("county layer loads");
    let names: Vec<&str> = counties
        .summary
        .top(5)
        .iter()
        .map(|region| region.name.as_str())
        .collect();
    assert_eq!(names, ["Story County, Iowa", "Polk County, Iowa"]);
    assert_eq!(counties.summary.avg_vacancy_rate_pct, 11.0);
    assert_eq!(counties.regions[1].color_bucket, ColorBucket::High);

    session
        .select_county_at("153", GeographyLevel::Tract)
        .expect("county selected");
    let tracts = session.refresh().expect("tract layer loads");
    assert_eq!(tracts.regions.len(), 2);
    assert_eq!(tracts.regions[0].vacancy_rate_pct, 5.0);
    assert_eq!(tracts.regions[1].name, "Census Tract 102");
    assert_eq!(tracts.regions[1].total_units, 0);
    assert_eq!(tracts.regions[1].color_bucket, ColorBucket::palest());

    assert_eq!(
        source.requests(),
        vec![
            (GeographyLevel::State, None, None),
            (GeographyLevel::County, Some("19".into()), None),
            (GeographyLevel::Tract, Some("19".into()), Some("153".into())),
        ]
    );
}

#[test]
fn block_group_layer_skips_malformed_rows_and_weights_the_average() {
    let source = Arc::new(iowa_source());
    let mut session = session_over(&source);
    session.select_state("19").expect("state selected");
    session
        .select_county_at("153", GeographyLevel::BlockGroup)
        .expect("county selected");

    let layer = session.refresh().expect("block groups load");
    assert_eq!(layer.regions.len(), 2);
    assert_eq!(layer.regions[0].vacancy_rate_pct, 10.0);
    assert_eq!(layer.regions[1].vacancy_rate_pct, 30.0);
    assert_eq!(layer.summary.avg_vacancy_rate_pct, 25.0);
    assert_eq!(layer.summary.total_vacant_units, 100);
}

#[test]
fn state_level_ignores_the_selected_state() {
    let source = Arc::new(iowa_source());
    let mut session = session_over(&source);
    session.select_state("19").expect("state selected");

    let layer = session.refresh().expect("state layer loads");
    assert_eq!(layer.regions.len(), 2);
    assert_eq!(source.requests(), vec![(GeographyLevel::State, None, None)]);
}

#[test]
fn stale_result_is_discarded_and_previous_layer_kept() {
    let source = Arc::new(iowa_source());
    let mut session = session_over(&source);
    session.refresh().expect("state layer loads");

    session.select_state("19").expect("state selected");
    let county_ticket = session
        .select_level(GeographyLevel::County)
        .expect("county level");
    let slow_result = session.fetch(&county_ticket).expect("county data fetched");

    session.select_state("17").expect("user moved on");
    let error = session
        .complete(county_ticket, slow_result)
        .expect_err("result is stale");

    match error {
        QueryError::Stale { requested, current } => {
            assert_eq!(requested.level, GeographyLevel::County);
            assert_eq!(current.path.state(), Some("17"));
        }
        other => panic!("unexpected error: {other}"),
    }

    let current = session.current().expect("previous layer kept");
    assert_eq!(current.scope.level, GeographyLevel::State);
    assert_eq!(current.regions.len(), 2);
}

#[test]
fn source_failure_keeps_last_good_layer() {
    let source = Arc::new(iowa_source());
    let mut session = session_over(&source);
    session.refresh().expect("state layer loads");

    session.select_state("19").expect("state selected");
    session
        .select_level(GeographyLevel::County)
        .expect("county level");
    source.fail_next(SourceError::Network("connection reset".into()));

    let error = session.refresh().expect_err("fetch fails");
    assert!(matches!(
        error,
        QueryError::Source(SourceError::Network(ref message)) if message == "connection reset"
    ));
    assert_eq!(
        session.current().map(|layer| layer.scope.level),
        Some(GeographyLevel::State)
    );

    let counties = session.refresh().expect("retry succeeds");
    assert_eq!(counties.scope.level, GeographyLevel::County);
}

#[test]
fn navigation_errors_leave_the_session_untouched() {
    let source = Arc::new(iowa_source());
    let mut session = session_over(&source);

    assert!(session.select_level(GeographyLevel::Tract).is_err());
    assert!(session.select_county("153").is_err());
    assert_eq!(session.navigator().level(), GeographyLevel::State);
    assert!(session.current().is_none());
}

#[test]
fn manually_fetched_layers_complete_when_current() {
    let source = Arc::new(iowa_source());
    let mut session = session_over(&source);
    let ticket = session.begin_query();

    let fetched = FetchedLayer {
        boundaries: vec![
            boundary(&[("STATE", "01")]),
            boundary(&[("STATE", "02")]),
        ],
        statistics: vec![statistic("Alabama", &["01"], 100, 10)],
        fetched_at: Utc::now(),
    };

    let layer = session.complete(ticket, fetched).expect("ticket current");
    assert_eq!(layer.regions[0].geo_id, "01");
    assert_eq!(layer.regions[0].vacancy_rate_pct, 10.0);
    assert_eq!(layer.regions[1].geo_id, "02");
    assert_eq!(layer.regions[1].vacancy_rate_pct, 0.0);
    assert_eq!(layer.regions[1].color_bucket, ColorBucket::palest());
}
