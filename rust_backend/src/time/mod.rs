//! Timezone resolution and local-time projection.
//!
//! - [`registry`]: validates identifiers against the zone-rule database
//! - [`projector`]: maps a UTC instant onto a zone's local calendar
//! - [`parse`]: parses RFC 3339 instants and `YYYY-MM-DD` dates

pub mod parse;
pub mod projector;
pub mod registry;

#[cfg(test)]
mod registry_tests;

pub use parse::{parse_local_date, parse_utc_instant};
pub use projector::{format_offset, project, weekday_name, LocalDecomposition};
pub use registry::{IanaZoneSource, ResolvedZone, TimezoneRegistry, ZoneRuleSource};
