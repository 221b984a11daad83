//! Fetch → normalize → resolve → merge.
//!
//! Address resolution for a page is one concurrent batch. Results are
//! paired positionally with their records, so output order always matches
//! fetch order. The batch is raced against a cancellation token owned by the
//! view; cancelling drops every in-flight request.

use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::fetch::IncidentFetcher;
use crate::geocode::{AddressResolver, GoogleGeocoder};
use crate::models::{EnrichedRecord, IncidentRecord};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("enrichment cancelled")]
pub struct Cancelled;

/// Enrich a single record. Records with no location skip the geocoder.
pub async fn enrich_record(record: IncidentRecord, resolver: &AddressResolver) -> EnrichedRecord {
    let address = match &record.location {
        Some(location) => Some(resolver.resolve(location).await.into_display()),
        None => None,
    };
    let display_timestamp = record.captured_at.display();

    EnrichedRecord {
        record,
        address,
        display_timestamp,
    }
}

/// Enrich every record concurrently and wait for the whole batch.
pub async fn enrich(
    records: Vec<IncidentRecord>,
    resolver: &AddressResolver,
    cancel: &CancellationToken,
) -> Result<Vec<EnrichedRecord>, Cancelled> {
    if cancel.is_cancelled() {
        return Err(Cancelled);
    }

    let count = records.len();
    let batch = join_all(
        records
            .into_iter()
            .map(|record| enrich_record(record, resolver)),
    );

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!(pending = count, "Enrichment cancelled; abandoning in-flight lookups");
            Err(Cancelled)
        }
        enriched = batch => {
            info!("Enriched {} incidents", count);
            Ok(enriched)
        }
    }
}

/// The fetcher and resolver for one listing, wired together.
#[derive(Clone)]
pub struct LitterLogPipeline {
    fetcher: IncidentFetcher,
    resolver: AddressResolver,
}

impl LitterLogPipeline {
    pub fn new(fetcher: IncidentFetcher, resolver: AddressResolver) -> Self {
        Self { fetcher, resolver }
    }

    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let fetcher = IncidentFetcher::new(config.listing_url(), timeout)?;
        let geocoder = GoogleGeocoder::new(&config.geocode_url, &config.geocode_api_key, timeout)?;
        Ok(Self::new(fetcher, AddressResolver::new(geocoder)))
    }

    pub fn fetcher(&self) -> &IncidentFetcher {
        &self.fetcher
    }

    /// Fetch the listing and enrich it. A failed fetch yields an empty list.
    pub async fn load(&self, cancel: &CancellationToken) -> Result<Vec<EnrichedRecord>, Cancelled> {
        let records = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Cancelled),
            records = self.fetcher.fetch() => records,
        };
        enrich(records, &self.resolver, cancel).await
    }
}
