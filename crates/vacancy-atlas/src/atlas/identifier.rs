//! Identifier decoding for boundary features and statistics rows.
//!
//! Both sources must encode a level's identifier identically: matching is exact
//! string equality after trimming, with no numeric or zero-padding normalization.
//! Within one query scope the level's own code is unique for states, counties and
//! tracts. Block-group codes repeat across tracts, so a block group is identified
//! by its tract code followed by its block-group digit on both sides.

use super::domain::{BoundaryRecord, GeographyLevel, StatisticRecord};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    #[error("{level} boundary has none of the identifier fields {candidates:?}")]
    MissingIdentifierField {
        level: GeographyLevel,
        candidates: &'static [&'static str],
    },
    #[error(
        "{level} statistics row '{name}' has {found} identifier component(s), {required} required"
    )]
    MalformedRow {
        level: GeographyLevel,
        name: String,
        found: usize,
        required: usize,
    },
}

const STATE_FIELDS: &[&str] = &["STATE", "STATEFP"];
const COUNTY_FIELDS: &[&str] = &["COUNTY", "COUNTYFP"];
const TRACT_FIELDS: &[&str] = &["TRACT", "TRACTCE"];
const BLOCK_GROUP_FIELDS: &[&str] = &["BLKGRP", "BLKGRPCE"];

/// A record carrying a level-dependent geographic identifier.
pub trait GeoRecord {
    fn extract_id(&self, level: GeographyLevel) -> Result<String, IdentifierError>;
}

impl GeoRecord for BoundaryRecord {
    fn extract_id(&self, level: GeographyLevel) -> Result<String, IdentifierError> {
        match level {
            GeographyLevel::BlockGroup => {
                let tract = first_field(self, level, TRACT_FIELDS)?;
                let group = first_field(self, level, BLOCK_GROUP_FIELDS)?;
                Ok(format!("{tract}{group}"))
            }
            _ => first_field(self, level, IdentifierCodec::boundary_fields(level)),
        }
    }
}

impl GeoRecord for StatisticRecord {
    fn extract_id(&self, level: GeographyLevel) -> Result<String, IdentifierError> {
        let components = &self.geo_components;
        let required = level.depth();
        if components.len() < required {
            return Err(IdentifierError::MalformedRow {
                level,
                name: self.name.clone(),
                found: components.len(),
                required,
            });
        }

        let own = components[components.len() - 1].trim();
        match level {
            GeographyLevel::BlockGroup => {
                let tract = components[components.len() - 2].trim();
                Ok(format!("{tract}{own}"))
            }
            _ => Ok(own.to_string()),
        }
    }
}

fn first_field(
    record: &BoundaryRecord,
    level: GeographyLevel,
    candidates: &'static [&'static str],
) -> Result<String, IdentifierError> {
    candidates
        .iter()
        .find_map(|field| record.field(field))
        .ok_or(IdentifierError::MissingIdentifierField { level, candidates })
}

/// Single translation point between source-specific identifier layouts.
pub struct IdentifierCodec;

impl IdentifierCodec {
    pub fn extract_id<R: GeoRecord>(
        record: &R,
        level: GeographyLevel,
    ) -> Result<String, IdentifierError> {
        record.extract_id(level)
    }

    pub fn equals(a: &str, b: &str) -> bool {
        a.trim() == b.trim()
    }

    /// Boundary attribute names holding a level's own code, in lookup order.
    pub const fn boundary_fields(level: GeographyLevel) -> &'static [&'static str] {
        match level {
            GeographyLevel::State => STATE_FIELDS,
            GeographyLevel::County => COUNTY_FIELDS,
            GeographyLevel::Tract => TRACT_FIELDS,
            GeographyLevel::BlockGroup => BLOCK_GROUP_FIELDS,
        }
    }
}
