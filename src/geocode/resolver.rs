//! Address resolution with placeholder outcomes instead of errors.

use serde::Serialize;
use tracing::{debug, error, warn};

use super::client::{GeocodeError, GoogleGeocoder};
use super::select::select_result;
use crate::models::Location;

pub const INVALID_COORDINATES: &str = "Invalid coordinates";
pub const FAILED_TO_FETCH: &str = "Failed to fetch address";
pub const ADDRESS_NOT_AVAILABLE: &str = "Address not available";
pub const ADDRESS_NOT_FOUND: &str = "Address not found";

/// Terminal result of resolving one location. Nothing here is retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum AddressOutcome {
    Resolved(String),
    NotFound,
    InvalidCoordinates,
    /// Geocoder answered with a non-success status code.
    HttpFailure(u16),
    /// Transport or decode failure.
    Unavailable,
}

impl AddressOutcome {
    /// Text shown in place of an address.
    pub fn as_display(&self) -> &str {
        match self {
            AddressOutcome::Resolved(address) => address,
            AddressOutcome::NotFound => ADDRESS_NOT_FOUND,
            AddressOutcome::InvalidCoordinates => INVALID_COORDINATES,
            AddressOutcome::HttpFailure(_) => FAILED_TO_FETCH,
            AddressOutcome::Unavailable => ADDRESS_NOT_AVAILABLE,
        }
    }

    pub fn into_display(self) -> String {
        match self {
            AddressOutcome::Resolved(address) => address,
            other => other.as_display().to_string(),
        }
    }
}

impl std::fmt::Display for AddressOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_display())
    }
}

/// Resolves locations to display addresses through a [`GoogleGeocoder`].
#[derive(Clone)]
pub struct AddressResolver {
    geocoder: GoogleGeocoder,
}

impl AddressResolver {
    pub fn new(geocoder: GoogleGeocoder) -> Self {
        Self { geocoder }
    }

    pub async fn resolve(&self, location: &Location) -> AddressOutcome {
        let Some(coordinate) = location.coordinate() else {
            warn!(kind = "invalid_input", "Invalid latitude or longitude values");
            return AddressOutcome::InvalidCoordinates;
        };

        let response = match self.geocoder.reverse(coordinate).await {
            Ok(r) => r,
            Err(GeocodeError::Status(status)) => {
                error!(kind = "status", status = status.as_u16(), %coordinate, "Geocode request failed");
                return AddressOutcome::HttpFailure(status.as_u16());
            }
            Err(e) => {
                error!(kind = e.kind(), %coordinate, error = %e, "Error fetching address");
                return AddressOutcome::Unavailable;
            }
        };

        match select_result(&response.results) {
            Some(result) => {
                debug!(%coordinate, address = %result.formatted_address, "Resolved address");
                AddressOutcome::Resolved(result.formatted_address.clone())
            }
            None => {
                debug!(
                    %coordinate,
                    status = response.status.as_deref().unwrap_or("unknown"),
                    "No geocode results"
                );
                AddressOutcome::NotFound
            }
        }
    }
}
