//! Integration tests for `AddressResolver` against a mocked geocoder.

use std::time::Duration;

use litterlog::geocode::{AddressOutcome, AddressResolver, GoogleGeocoder};
use litterlog::{Coordinate, Location};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver(server: &MockServer) -> AddressResolver {
    let geocoder = GoogleGeocoder::new(
        format!("{}/maps/api/geocode/json", server.uri()),
        "test-key",
        Duration::from_secs(5),
    )
    .expect("client construction should not fail");
    AddressResolver::new(geocoder)
}

fn bengaluru() -> Location {
    Location::Valid(Coordinate::new(12.9716, 77.5946).unwrap())
}

#[tokio::test]
async fn sends_six_decimal_latlng_and_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/maps/api/geocode/json"))
        .and(query_param("latlng", "12.971600,77.594600"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"formatted_address": "Bengaluru, Karnataka, India", "types": ["locality", "political"]}
            ],
            "status": "OK"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = resolver(&server).resolve(&bengaluru()).await;
    assert_eq!(
        outcome,
        AddressOutcome::Resolved("Bengaluru, Karnataka, India".to_string())
    );
}

#[tokio::test]
async fn locality_wins_over_earlier_matches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"formatted_address": "India", "types": ["country", "political"]},
                {"formatted_address": "Karnataka, India", "types": ["administrative_area_level_1"]},
                {"formatted_address": "MG Road, Bengaluru", "types": ["route"]},
                {"formatted_address": "Bengaluru, Karnataka, India", "types": ["locality"]}
            ],
            "status": "OK"
        })))
        .mount(&server)
        .await;

    let outcome = resolver(&server).resolve(&bengaluru()).await;
    assert_eq!(outcome.to_string(), "Bengaluru, Karnataka, India");
}

#[tokio::test]
async fn empty_results_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"results": [], "status": "ZERO_RESULTS"})),
        )
        .mount(&server)
        .await;

    let outcome = resolver(&server).resolve(&bengaluru()).await;
    assert_eq!(outcome, AddressOutcome::NotFound);
    assert_eq!(outcome.to_string(), "Address not found");
}

#[tokio::test]
async fn invalid_location_never_hits_the_network() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = resolver(&server).resolve(&Location::Invalid).await;
    assert_eq!(outcome.to_string(), "Invalid coordinates");
}

#[tokio::test]
async fn server_error_is_failed_to_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = resolver(&server).resolve(&bengaluru()).await;
    assert_eq!(outcome, AddressOutcome::HttpFailure(503));
    assert_eq!(outcome.to_string(), "Failed to fetch address");
}

#[tokio::test]
async fn garbage_body_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let outcome = resolver(&server).resolve(&bengaluru()).await;
    assert_eq!(outcome.to_string(), "Address not available");
}
