use crate::atlas::{GeographyLevel, SelectionPath};

/// TIGERweb map service layer serving each level's polygons.
pub(crate) fn layer_path(level: GeographyLevel) -> &'static str {
    match level {
        GeographyLevel::State => "State_County/MapServer/0",
        GeographyLevel::County => "State_County/MapServer/1",
        GeographyLevel::Tract => "Tracts_Blocks/MapServer/0",
        GeographyLevel::BlockGroup => "Tracts_Blocks/MapServer/1",
    }
}

/// ArcGIS `where` filter for the scope; `None` when a required parent is missing.
pub(crate) fn where_clause(level: GeographyLevel, path: &SelectionPath) -> Option<String> {
    match level {
        GeographyLevel::State => Some("1=1".to_string()),
        GeographyLevel::County => {
            let state = path.state()?;
            Some(format!("STATE='{}'", quote(state)))
        }
        GeographyLevel::Tract | GeographyLevel::BlockGroup => {
            let state = path.state()?;
            let county = path.county()?;
            Some(format!(
                "STATE='{}' AND COUNTY='{}'",
                quote(state),
                quote(county)
            ))
        }
    }
}

fn quote(value: &str) -> String {
    value.replace('\'', "''")
}
