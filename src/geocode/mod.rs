//! Reverse geocoding: HTTP client, result selection, and address resolution.

mod client;
mod resolver;
mod select;

pub use client::{GeocodeError, GeocodeResponse, GeocodeResult, GoogleGeocoder};
pub use resolver::{
    AddressOutcome, AddressResolver, ADDRESS_NOT_AVAILABLE, ADDRESS_NOT_FOUND, FAILED_TO_FETCH,
    INVALID_COORDINATES,
};
pub use select::{select_result, PLACE_TYPE_PRECEDENCE};
