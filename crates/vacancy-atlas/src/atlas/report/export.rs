use serde::Serialize;
use std::io::Write;

use super::super::domain::RegionStat;

#[derive(Debug, Serialize)]
struct TableRow<'a> {
    name: &'a str,
    geo_id: &'a str,
    level: &'static str,
    total_units: u64,
    vacant_units: u64,
    vacancy_rate_pct: f64,
    color: &'static str,
}

/// Writes the complete data table, one row per region in the given order.
pub fn write_table_csv<W: Write>(writer: W, regions: &[RegionStat]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for region in regions {
        csv_writer.serialize(TableRow {
            name: &region.name,
            geo_id: &region.geo_id,
            level: region.level.as_str(),
            total_units: region.total_units,
            vacant_units: region.vacant_units,
            vacancy_rate_pct: region.vacancy_rate_pct,
            color: region.color_bucket.color(),
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::domain::GeographyLevel;
    use crate::atlas::rate::ColorBucket;

    #[test]
    fn writes_header_and_quoted_names() {
        let regions = vec![RegionStat {
            name: "Polk County, Iowa".to_string(),
            geo_id: "153".to_string(),
            level: GeographyLevel::County,
            total_units: 200,
            vacant_units: 13,
            vacancy_rate_pct: 6.5,
            color_bucket: ColorBucket::Low,
        }];

        let mut buffer = Vec::new();
        write_table_csv(&mut buffer, &regions).expect("csv written");
        let text = String::from_utf8(buffer).expect("utf8");

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("name,geo_id,level,total_units,vacant_units,vacancy_rate_pct,color")
        );
        assert_eq!(
            lines.next(),
            Some("\"Polk County, Iowa\",153,county,200,13,6.5,#FD8D3C")
        );
        assert_eq!(lines.next(), None);
    }
}
