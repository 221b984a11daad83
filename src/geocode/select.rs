//! Picking the most useful result out of a reverse-geocode response.

use super::client::GeocodeResult;

/// Place types in order of preference.
pub const PLACE_TYPE_PRECEDENCE: &[&str] = &["locality", "administrative_area_level_1", "country"];

/// Best result by [`PLACE_TYPE_PRECEDENCE`], falling back to the first one.
///
/// Precedence is evaluated across the whole list, so a `locality` anywhere
/// beats an earlier `country`.
pub fn select_result(results: &[GeocodeResult]) -> Option<&GeocodeResult> {
    PLACE_TYPE_PRECEDENCE
        .iter()
        .find_map(|place_type| results.iter().find(|r| r.has_type(place_type)))
        .or_else(|| results.first())
}
