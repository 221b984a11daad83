//! Incident listing fetcher for the backend API.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::models::{IncidentRecord, IncidentSource};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("listing request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("listing endpoint returned {0}")]
    Status(StatusCode),

    #[error("malformed listing payload: {0}")]
    Payload(String),
}

impl FetchError {
    fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Status(_) => "status",
            FetchError::Payload(_) => "payload",
        }
    }
}

/// Listing bodies seen in the wild: a wrapped array or a bare one.
///
/// Items stay as raw JSON and are decoded one at a time; an unreadable item
/// is skipped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListingBody {
    Wrapped {
        #[serde(alias = "images", alias = "incidents", alias = "logs", alias = "data")]
        items: Vec<Value>,
    },
    Bare(Vec<Value>),
}

impl ListingBody {
    fn into_items(self) -> Vec<Value> {
        match self {
            ListingBody::Wrapped { items } => items,
            ListingBody::Bare(items) => items,
        }
    }
}

/// Fetches incident records from one listing endpoint.
#[derive(Clone)]
pub struct IncidentFetcher {
    client: Client,
    url: String,
}

impl IncidentFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("litterlog/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and normalize, in server order. Any failure is logged and
    /// becomes an empty list.
    pub async fn fetch(&self) -> Vec<IncidentRecord> {
        match self.try_fetch().await {
            Ok(records) => records,
            Err(e) => {
                error!(kind = e.kind(), url = %self.url, error = %e, "Failed to fetch incidents");
                Vec::new()
            }
        }
    }

    pub async fn try_fetch(&self) -> Result<Vec<IncidentRecord>, FetchError> {
        debug!(url = %self.url, "Fetching incident listing");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let bytes = response.bytes().await.map_err(FetchError::Transport)?;
        let body: ListingBody =
            serde_json::from_slice(&bytes).map_err(|e| FetchError::Payload(e.to_string()))?;

        let items = body.into_items();
        let total = items.len();
        let mut skipped = 0;
        let mut records = Vec::with_capacity(total);

        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<IncidentSource>(item) {
                Ok(source) => records.extend(IncidentRecord::from_source(source)),
                Err(e) => {
                    warn!(kind = "payload", url = %self.url, index, error = %e, "Skipping unreadable incident");
                    skipped += 1;
                }
            }
        }

        info!(
            "Fetched {} incidents ({} unreadable, {} dropped as deleted)",
            records.len(),
            skipped,
            total - skipped - records.len()
        );
        Ok(records)
    }
}
