//! Litterlog - litter report dashboard pipeline
//!
//! Fetches reported litter incidents from the backend, resolves a readable
//! address for each through reverse geocoding, and renders them. Shared by
//! the `litterlog` CLI and the `litterlog-server` HTTP view.

pub mod config;
pub mod fetch;
pub mod geocode;
pub mod models;
pub mod pipeline;
pub mod session;
pub mod view;

pub use config::Config;
pub use models::{Coordinate, EnrichedRecord, IncidentRecord, IncidentSource, Location, User};
pub use pipeline::{enrich, Cancelled, LitterLogPipeline};
