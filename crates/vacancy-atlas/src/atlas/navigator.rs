use serde::Serialize;

use super::domain::{GeographyLevel, QueryScope, SelectionPath};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("cannot move to {requested} level: {reason}")]
    InvalidTransition {
        requested: GeographyLevel,
        reason: &'static str,
    },
}

/// Scope captured when a query starts; compared against the navigator when the
/// query's data arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryTicket {
    pub scope: QueryScope,
    pub generation: u64,
}

/// Sole owner of the drill-down selection. Failed transitions leave it untouched.
#[derive(Debug, Clone)]
pub struct HierarchyNavigator {
    level: GeographyLevel,
    path: SelectionPath,
    generation: u64,
}

impl Default for HierarchyNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchyNavigator {
    /// Starts at the national view: every state, nothing selected.
    pub fn new() -> Self {
        Self {
            level: GeographyLevel::State,
            path: SelectionPath::national(),
            generation: 0,
        }
    }

    /// Replays the transitions a presenter would make to reach `level` under the
    /// given parents.
    pub fn at(
        level: GeographyLevel,
        state: Option<&str>,
        county: Option<&str>,
    ) -> Result<Self, NavigationError> {
        let mut navigator = Self::new();
        if let Some(state) = state {
            navigator.select_state(state)?;
        }
        if let Some(county) = county {
            navigator.select_county(county)?;
        }
        navigator.select_level(level)?;
        Ok(navigator)
    }

    pub fn reset(&mut self) {
        self.level = GeographyLevel::State;
        self.path = SelectionPath::national();
        self.bump();
    }

    pub fn select_state(&mut self, state_id: &str) -> Result<(), NavigationError> {
        let state_id = required_id(state_id, GeographyLevel::State, "state id is blank")?;
        self.path = SelectionPath::with_state(state_id);
        self.level = GeographyLevel::State;
        self.bump();
        Ok(())
    }

    pub fn select_county(&mut self, county_id: &str) -> Result<(), NavigationError> {
        self.select_county_at(county_id, GeographyLevel::County)
    }

    /// Selects a county and lands on `level`, which must be County or finer.
    pub fn select_county_at(
        &mut self,
        county_id: &str,
        level: GeographyLevel,
    ) -> Result<(), NavigationError> {
        if level == GeographyLevel::State {
            return Err(NavigationError::InvalidTransition {
                requested: level,
                reason: "selecting a county cannot land on the state level",
            });
        }
        let county_id = required_id(county_id, GeographyLevel::County, "county id is blank")?;
        let path = self
            .path
            .with_county(county_id)
            .ok_or(NavigationError::InvalidTransition {
                requested: GeographyLevel::County,
                reason: "select a state before a county",
            })?;

        self.path = path;
        self.level = level;
        self.bump();
        Ok(())
    }

    pub fn select_level(&mut self, level: GeographyLevel) -> Result<(), NavigationError> {
        if level.requires_state() && self.path.state().is_none() {
            return Err(NavigationError::InvalidTransition {
                requested: level,
                reason: "a state must be selected first",
            });
        }
        if level.requires_county() && self.path.county().is_none() {
            return Err(NavigationError::InvalidTransition {
                requested: level,
                reason: "a county must be selected first",
            });
        }

        self.level = level;
        self.bump();
        Ok(())
    }

    pub fn level(&self) -> GeographyLevel {
        self.level
    }

    pub fn path(&self) -> &SelectionPath {
        &self.path
    }

    pub fn current_scope(&self) -> QueryScope {
        QueryScope {
            level: self.level,
            path: self.path.clone(),
        }
    }

    pub fn ticket(&self) -> QueryTicket {
        QueryTicket {
            scope: self.current_scope(),
            generation: self.generation,
        }
    }

    /// True while no selection change happened since `ticket` was issued.
    pub fn is_current(&self, ticket: &QueryTicket) -> bool {
        ticket.generation == self.generation && ticket.scope == self.current_scope()
    }

    fn bump(&mut self) {
        self.generation += 1;
    }
}

fn required_id(
    raw: &str,
    requested: GeographyLevel,
    reason: &'static str,
) -> Result<String, NavigationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NavigationError::InvalidTransition { requested, reason });
    }
    Ok(trimmed.to_string())
}
