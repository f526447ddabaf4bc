//! Drill-down engine joining census boundary geometry with housing vacancy
//! statistics, from the national view down to block groups.

pub mod atlas;
pub mod config;
pub mod error;
pub mod sources;
pub mod telemetry;
