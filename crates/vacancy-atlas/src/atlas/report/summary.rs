use serde::Serialize;

use super::super::domain::RegionStat;
use super::super::rate::round_to_tenth;
use super::views::{RegionRow, SummaryView};

pub const DEFAULT_TOP_REGIONS: usize = 5;

/// Headline figures and the rate-ranked regions of one layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub avg_vacancy_rate_pct: f64,
    pub total_vacant_units: u64,
    pub ranked_regions: Vec<RegionStat>,
}

impl AggregateSummary {
    /// Highest-rate regions, a prefix of the ranking.
    pub fn top(&self, count: usize) -> &[RegionStat] {
        &self.ranked_regions[..count.min(self.ranked_regions.len())]
    }

    pub fn table(&self) -> &[RegionStat] {
        &self.ranked_regions
    }

    pub fn view(&self, top: usize) -> SummaryView {
        SummaryView {
            avg_vacancy_rate_pct: self.avg_vacancy_rate_pct,
            total_vacant_units: self.total_vacant_units,
            region_count: self.ranked_regions.len(),
            top: self.top(top).iter().map(RegionRow::from_region).collect(),
        }
    }
}

pub struct SummaryAggregator;

impl SummaryAggregator {
    /// Unit-weighted average (total vacant over total units, not a mean of
    /// per-region rates) plus a stable descending ranking by rate.
    pub fn summarize(regions: &[RegionStat]) -> AggregateSummary {
        let (total_units, total_vacant_units) =
            regions.iter().fold((0_u64, 0_u64), |(total, vacant), region| {
                (
                    total.saturating_add(region.total_units),
                    vacant.saturating_add(region.vacant_units),
                )
            });

        let avg_vacancy_rate_pct = if total_units == 0 {
            0.0
        } else {
            round_to_tenth(total_vacant_units as f64 / total_units as f64 * 100.0)
        };

        let mut ranked_regions = regions.to_vec();
        ranked_regions.sort_by(|a, b| b.vacancy_rate_pct.total_cmp(&a.vacancy_rate_pct));

        AggregateSummary {
            avg_vacancy_rate_pct,
            total_vacant_units,
            ranked_regions,
        }
    }
}
