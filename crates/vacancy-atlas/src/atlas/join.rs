use std::collections::HashMap;

use tracing::{debug, warn};

use super::domain::{BoundaryRecord, GeographyLevel, RegionStat, StatisticRecord};
use super::identifier::IdentifierCodec;
use super::rate::{ColorBucket, RateCalculator};

/// Joins boundary features with statistics rows by geographic identifier.
pub struct GeoJoinEngine;

impl GeoJoinEngine {
    /// One `RegionStat` per boundary, in boundary order. Boundaries without a
    /// statistic are kept at zero counts; statistics without a boundary are dropped.
    pub fn join(
        level: GeographyLevel,
        boundaries: &[BoundaryRecord],
        statistics: &[StatisticRecord],
    ) -> Vec<RegionStat> {
        let index = index_statistics(level, statistics);
        let mut matched = 0_usize;

        let regions: Vec<RegionStat> = boundaries
            .iter()
            .enumerate()
            .map(|(position, boundary)| {
                let geo_id = match IdentifierCodec::extract_id(boundary, level) {
                    Ok(geo_id) => geo_id,
                    Err(err) => {
                        warn!(%level, position, error = %err, "boundary identifier unreadable");
                        return defaulted(level, String::new(), boundary);
                    }
                };

                match index.get(geo_id.as_str()) {
                    Some(statistic) => {
                        matched += 1;
                        joined(level, geo_id, statistic)
                    }
                    None => defaulted(level, geo_id, boundary),
                }
            })
            .collect();

        debug!(
            %level,
            boundaries = boundaries.len(),
            statistics = statistics.len(),
            matched,
            "joined layer"
        );

        regions
    }
}

/// First row wins when two rows decode to the same identifier.
fn index_statistics(
    level: GeographyLevel,
    statistics: &[StatisticRecord],
) -> HashMap<String, &StatisticRecord> {
    let mut index = HashMap::with_capacity(statistics.len());

    for (position, statistic) in statistics.iter().enumerate() {
        let geo_id = match IdentifierCodec::extract_id(statistic, level) {
            Ok(geo_id) => geo_id,
            Err(err) => {
                warn!(%level, position, error = %err, "skipping statistics row");
                continue;
            }
        };

        if index.contains_key(&geo_id) {
            debug!(%level, %geo_id, position, "duplicate statistics row ignored");
            continue;
        }
        index.insert(geo_id, statistic);
    }

    index
}

fn joined(level: GeographyLevel, geo_id: String, statistic: &StatisticRecord) -> RegionStat {
    let vacancy_rate_pct =
        RateCalculator::compute_rate(statistic.total_units, statistic.vacant_units);

    RegionStat {
        name: statistic.name.clone(),
        geo_id,
        level,
        total_units: statistic.total_units,
        vacant_units: statistic.vacant_units,
        vacancy_rate_pct,
        color_bucket: RateCalculator::bucket(vacancy_rate_pct),
    }
}

fn defaulted(level: GeographyLevel, geo_id: String, boundary: &BoundaryRecord) -> RegionStat {
    let name = boundary.display_name().unwrap_or_else(|| geo_id.clone());

    RegionStat {
        name,
        geo_id,
        level,
        total_units: 0,
        vacant_units: 0,
        vacancy_rate_pct: 0.0,
        color_bucket: ColorBucket::palest(),
    }
}
