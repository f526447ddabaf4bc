mod export;
mod summary;
pub mod views;

pub use export::write_table_csv;
pub use summary::{AggregateSummary, SummaryAggregator, DEFAULT_TOP_REGIONS};
