use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::rate::ColorBucket;

/// One tier of the census hierarchy, ordered from coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeographyLevel {
    State,
    County,
    Tract,
    BlockGroup,
}

impl GeographyLevel {
    pub const fn ordered() -> [Self; 4] {
        [Self::State, Self::County, Self::Tract, Self::BlockGroup]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::State => "State",
            Self::County => "County",
            Self::Tract => "Census Tract",
            Self::BlockGroup => "Block Group",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::State => "state",
            Self::County => "county",
            Self::Tract => "tract",
            Self::BlockGroup => "block_group",
        }
    }

    /// Number of identifier components a statistics row of this level carries
    /// (state, county, tract, block group).
    pub const fn depth(self) -> usize {
        match self {
            Self::State => 1,
            Self::County => 2,
            Self::Tract => 3,
            Self::BlockGroup => 4,
        }
    }

    pub const fn child(self) -> Option<Self> {
        match self {
            Self::State => Some(Self::County),
            Self::County => Some(Self::Tract),
            Self::Tract => Some(Self::BlockGroup),
            Self::BlockGroup => None,
        }
    }

    pub const fn requires_state(self) -> bool {
        !matches!(self, Self::State)
    }

    pub const fn requires_county(self) -> bool {
        matches!(self, Self::Tract | Self::BlockGroup)
    }
}

impl fmt::Display for GeographyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown geography level '{0}'")]
pub struct UnknownLevel(pub String);

impl FromStr for GeographyLevel {
    type Err = UnknownLevel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "state" => Ok(Self::State),
            "county" => Ok(Self::County),
            "tract" | "census_tract" => Ok(Self::Tract),
            "block_group" | "block" | "bg" => Ok(Self::BlockGroup),
            _ => Err(UnknownLevel(value.to_string())),
        }
    }
}

/// Parent selection constraining a query. A county is only ever present
/// alongside its state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionPath {
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    county: Option<String>,
}

impl SelectionPath {
    pub fn national() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn county(&self) -> Option<&str> {
        self.county.as_deref()
    }

    pub(crate) fn with_state(state: String) -> Self {
        Self {
            state: Some(state),
            county: None,
        }
    }

    pub(crate) fn with_county(&self, county: String) -> Option<Self> {
        let state = self.state.clone()?;
        Some(Self {
            state: Some(state),
            county: Some(county),
        })
    }
}

/// The exact query a data source needs to serve: which level, under which parents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryScope {
    pub level: GeographyLevel,
    #[serde(flatten)]
    pub path: SelectionPath,
}

impl fmt::Display for QueryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level)?;
        if let Some(state) = self.path.state() {
            write!(f, " state={state}")?;
        }
        if let Some(county) = self.path.county() {
            write!(f, " county={county}")?;
        }
        Ok(())
    }
}

/// Region geometry plus the raw attribute fields published by the boundary service.
#[derive(Debug, Clone)]
pub struct BoundaryRecord {
    pub geometry: MultiPolygon<f64>,
    pub properties: Map<String, Value>,
}

impl BoundaryRecord {
    pub fn new(geometry: MultiPolygon<f64>, properties: Map<String, Value>) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    /// Attribute value rendered as text; numbers are accepted, blanks are not.
    pub fn field(&self, name: &str) -> Option<String> {
        match self.properties.get(name)? {
            Value::String(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    pub fn display_name(&self) -> Option<String> {
        ["NAME", "BASENAME", "name"]
            .iter()
            .find_map(|field| self.field(field))
    }
}

/// Raw statistics row: counts plus trailing identifier components, coarsest first
/// so the finest-level code is last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticRecord {
    pub name: String,
    pub total_units: u64,
    pub vacant_units: u64,
    pub geo_components: Vec<String>,
}

/// A boundary joined with its statistic, ready for shading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStat {
    pub name: String,
    pub geo_id: String,
    pub level: GeographyLevel,
    pub total_units: u64,
    pub vacant_units: u64,
    pub vacancy_rate_pct: f64,
    pub color_bucket: ColorBucket,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOption {
    pub id: String,
    pub name: String,
}
