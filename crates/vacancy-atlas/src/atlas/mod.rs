pub mod domain;
pub mod identifier;
pub mod join;
pub mod navigator;
pub mod rate;
pub mod report;
pub mod session;

pub use domain::{
    BoundaryRecord, GeographyLevel, PlaceOption, QueryScope, RegionStat, SelectionPath,
    StatisticRecord, UnknownLevel,
};
pub use identifier::{GeoRecord, IdentifierCodec, IdentifierError};
pub use join::GeoJoinEngine;
pub use navigator::{HierarchyNavigator, NavigationError, QueryTicket};
pub use rate::{ColorBucket, LegendEntry, RateCalculator};
pub use report::{AggregateSummary, SummaryAggregator, DEFAULT_TOP_REGIONS};
pub use session::{fetch_layer, AtlasSession, FetchedLayer, LayerSnapshot, QueryError};
