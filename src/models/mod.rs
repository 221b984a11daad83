//! Core data models for the litter log pipeline.

pub mod coordinate;
pub mod incident;
pub mod timestamp;
pub mod user;

pub use coordinate::{Coordinate, Location, RawLocation};
pub use incident::{EnrichedRecord, IncidentRecord, IncidentSource, LegacyIncident, StructuredIncident};
pub use timestamp::{format_timestamp, parse_timestamp, CapturedAt};
pub use user::User;
