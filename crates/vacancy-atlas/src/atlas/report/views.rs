use serde::Serialize;

use super::super::domain::RegionStat;
use super::super::rate::ColorBucket;

/// Presenter-facing row with display strings alongside the raw figures.
#[derive(Debug, Clone, Serialize)]
pub struct RegionRow {
    pub name: String,
    pub geo_id: String,
    pub level_label: &'static str,
    pub total_units: u64,
    pub vacant_units: u64,
    pub vacancy_rate_pct: f64,
    pub vacancy_rate: String,
    pub color_bucket: ColorBucket,
    pub bucket_index: u8,
    pub color: &'static str,
}

impl RegionRow {
    pub fn from_region(region: &RegionStat) -> Self {
        Self {
            name: region.name.clone(),
            geo_id: region.geo_id.clone(),
            level_label: region.level.label(),
            total_units: region.total_units,
            vacant_units: region.vacant_units,
            vacancy_rate_pct: region.vacancy_rate_pct,
            vacancy_rate: format!("{:.1}%", region.vacancy_rate_pct),
            color_bucket: region.color_bucket,
            bucket_index: region.color_bucket.index(),
            color: region.color_bucket.color(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub avg_vacancy_rate_pct: f64,
    pub total_vacant_units: u64,
    pub region_count: usize,
    pub top: Vec<RegionRow>,
}
