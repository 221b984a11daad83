//! Google reverse-geocoding client.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::models::Coordinate;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocode request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("geocoder returned {0}")]
    Status(StatusCode),

    #[error("malformed geocode response: {0}")]
    Parse(String),

    #[error("invalid geocode endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

impl GeocodeError {
    pub fn kind(&self) -> &'static str {
        match self {
            GeocodeError::Transport(_) => "transport",
            GeocodeError::Status(_) => "status",
            GeocodeError::Parse(_) => "payload",
            GeocodeError::Endpoint(_) => "config",
        }
    }
}

/// One entry in the geocoder's `results` array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl GeocodeResult {
    pub fn has_type(&self, place_type: &str) -> bool {
        self.types.iter().any(|t| t == place_type)
    }
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Thin client for the `geocode/json` endpoint.
#[derive(Clone)]
pub struct GoogleGeocoder {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("litterlog/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(client, endpoint, api_key))
    }

    pub fn with_client(
        client: Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// Reverse-geocode a single coordinate.
    pub async fn reverse(&self, coordinate: Coordinate) -> Result<GeocodeResponse, GeocodeError> {
        let latlng = coordinate.to_query_value();
        debug!(latlng = %latlng, "Reverse geocoding");

        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut()
            .append_pair("latlng", &latlng)
            .append_pair("key", &self.api_key);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(GeocodeError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status));
        }

        let bytes = response.bytes().await.map_err(GeocodeError::Transport)?;
        serde_json::from_slice(&bytes).map_err(|e| GeocodeError::Parse(e.to_string()))
    }
}
