use serde_json::Value;
use tracing::debug;

use crate::atlas::{GeographyLevel, PlaceOption, SelectionPath, StatisticRecord};
use crate::sources::SourceError;

/// ACS geography predicate name for a level.
pub(crate) fn predicate(level: GeographyLevel) -> &'static str {
    match level {
        GeographyLevel::State => "state",
        GeographyLevel::County => "county",
        GeographyLevel::Tract => "tract",
        GeographyLevel::BlockGroup => "block group",
    }
}

/// `for`/`in` query pairs for the scope; `None` when a required parent is missing.
pub(crate) fn geography_params(
    level: GeographyLevel,
    path: &SelectionPath,
) -> Option<Vec<(&'static str, String)>> {
    let mut params = vec![("for", format!("{}:*", predicate(level)))];

    match level {
        GeographyLevel::State => {}
        GeographyLevel::County => {
            params.push(("in", format!("state:{}", path.state()?)));
        }
        GeographyLevel::Tract | GeographyLevel::BlockGroup => {
            params.push((
                "in",
                format!("state:{} county:{}", path.state()?, path.county()?),
            ));
        }
    }

    Some(params)
}

/// Decodes an ACS table response (header row first) into statistics rows.
///
/// Counts are located by header name. Unparsable or negative counts (the API's
/// annotation sentinels) read as zero. Columns after the last requested variable
/// are the geography components.
pub fn decode_statistics(
    bytes: &[u8],
    total_variable: &str,
    vacant_variable: &str,
) -> Result<Vec<StatisticRecord>, SourceError> {
    let Some((header, rows)) = decode_table(bytes)? else {
        return Ok(Vec::new());
    };

    let name_index = column(&header, "NAME")?;
    let total_index = column(&header, total_variable)?;
    let vacant_index = column(&header, vacant_variable)?;
    let first_geography = name_index.max(total_index).max(vacant_index) + 1;

    Ok(rows
        .iter()
        .map(|row| StatisticRecord {
            name: cell(row, name_index),
            total_units: parse_count(&cell(row, total_index)),
            vacant_units: parse_count(&cell(row, vacant_index)),
            geo_components: row.iter().skip(first_geography).map(cell_text).collect(),
        })
        .collect())
}

/// Decodes a `NAME` + geography response into selectable places sorted by name.
/// County names keep only the part before the first comma.
pub fn decode_places(bytes: &[u8], level: GeographyLevel) -> Result<Vec<PlaceOption>, SourceError> {
    let Some((header, rows)) = decode_table(bytes)? else {
        return Ok(Vec::new());
    };
    let name_index = column(&header, "NAME")?;

    let mut places: Vec<PlaceOption> = rows
        .iter()
        .filter_map(|row| {
            let id = row.last().map(cell_text).filter(|id| !id.is_empty())?;
            let name = cell(row, name_index);
            let name = match level {
                GeographyLevel::State => name,
                _ => name.split(',').next().unwrap_or_default().trim().to_string(),
            };
            Some(PlaceOption { id, name })
        })
        .collect();

    places.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(places)
}

type Table = (Vec<String>, Vec<Vec<Value>>);

fn decode_table(bytes: &[u8]) -> Result<Option<Table>, SourceError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let mut rows: Vec<Vec<Value>> = serde_json::from_slice(bytes)
        .map_err(|err| SourceError::Decode(format!("statistics table: {err}")))?;
    if rows.is_empty() {
        return Ok(None);
    }

    let header = rows.remove(0).iter().map(cell_text).collect();
    debug!(rows = rows.len(), "decoded statistics table");
    Ok(Some((header, rows)))
}

fn column(header: &[String], name: &str) -> Result<usize, SourceError> {
    header
        .iter()
        .position(|candidate| candidate == name)
        .ok_or_else(|| SourceError::Decode(format!("statistics table has no '{name}' column")))
}

fn cell(row: &[Value], index: usize) -> String {
    row.get(index).map(cell_text).unwrap_or_default()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn parse_count(raw: &str) -> u64 {
    raw.parse::<i64>()
        .ok()
        .and_then(|count| u64::try_from(count).ok())
        .unwrap_or(0)
}
