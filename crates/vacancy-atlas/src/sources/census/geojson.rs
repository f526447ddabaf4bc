use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{Map, Value};
use tracing::warn;

use crate::atlas::BoundaryRecord;
use crate::sources::SourceError;

/// One response of the boundary service.
#[derive(Debug, Clone, Default)]
pub struct BoundaryPage {
    pub records: Vec<BoundaryRecord>,
    /// Set when the service hit its per-request feature cap and more features
    /// remain past this page.
    pub exceeded_transfer_limit: bool,
}

/// Decodes a GeoJSON FeatureCollection into boundary records.
///
/// Polygon and MultiPolygon geometries are accepted; a feature without geometry
/// keeps an empty shape so its attributes still take part in the join. A
/// truncated collection is logged; use [`decode_boundary_page`] to page past it.
pub fn decode_boundaries(bytes: &[u8]) -> Result<Vec<BoundaryRecord>, SourceError> {
    let page = decode_boundary_page(bytes)?;
    if page.exceeded_transfer_limit {
        warn!(
            features = page.records.len(),
            "boundary collection exceeded the service transfer limit"
        );
    }
    Ok(page.records)
}

pub fn decode_boundary_page(bytes: &[u8]) -> Result<BoundaryPage, SourceError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(BoundaryPage::default());
    }

    let root: Value = serde_json::from_slice(bytes)
        .map_err(|err| SourceError::Decode(format!("boundary collection: {err}")))?;

    if let Some(error) = root.get("error") {
        return Err(SourceError::Decode(format!("boundary service error: {error}")));
    }

    let features = root
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::Decode("boundary collection has no features array".into()))?;

    let records = features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            decode_feature(feature)
                .map_err(|reason| SourceError::Decode(format!("feature {index}: {reason}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BoundaryPage {
        records,
        exceeded_transfer_limit: exceeded_transfer_limit(&root),
    })
}

/// ArcGIS reports truncation at the top level or, for `f=geojson`, inside the
/// collection's `properties`.
fn exceeded_transfer_limit(root: &Value) -> bool {
    let flag = |value: &Value| {
        value
            .get("exceededTransferLimit")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    };
    flag(root) || root.get("properties").is_some_and(flag)
}

fn decode_feature(feature: &Value) -> Result<BoundaryRecord, String> {
    let properties = feature
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_else(Map::new);

    let geometry = match feature.get("geometry") {
        None | Some(Value::Null) => MultiPolygon::new(Vec::new()),
        Some(geometry) => decode_geometry(geometry)?,
    };

    Ok(BoundaryRecord::new(geometry, properties))
}

fn decode_geometry(geometry: &Value) -> Result<MultiPolygon<f64>, String> {
    let kind = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or("geometry has no type")?;
    let coordinates = geometry
        .get("coordinates")
        .and_then(Value::as_array)
        .ok_or("geometry has no coordinates")?;

    match kind {
        "Polygon" => Ok(MultiPolygon::new(vec![parse_polygon(coordinates)?])),
        "MultiPolygon" => coordinates
            .iter()
            .map(|polygon| {
                polygon
                    .as_array()
                    .ok_or_else(|| "polygon is not an array".to_string())
                    .and_then(|rings| parse_polygon(rings))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(MultiPolygon::new),
        other => Err(format!("unsupported geometry type '{other}'")),
    }
}

fn parse_polygon(rings: &[Value]) -> Result<Polygon<f64>, String> {
    let mut rings = rings.iter().map(parse_ring);
    let exterior = match rings.next() {
        Some(ring) => ring?,
        None => LineString::new(Vec::new()),
    };
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn parse_ring(ring: &Value) -> Result<LineString<f64>, String> {
    let positions = ring.as_array().ok_or("ring is not an array")?;
    positions
        .iter()
        .map(|position| {
            let pair = position
                .as_array()
                .ok_or_else(|| "position is not an array".to_string())?;
            match (
                pair.first().and_then(Value::as_f64),
                pair.get(1).and_then(Value::as_f64),
            ) {
                (Some(x), Some(y)) => Ok(Coord { x, y }),
                _ => Err("position needs numeric x and y".to_string()),
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}
