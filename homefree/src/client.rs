//! HTTP client for the upstream open-data services.
//!
//! This module is only available when the `client` feature is enabled.
//!
//! # Data Sources
//!
//! - **Overpass API**: OpenStreetMap tag queries, answered with counts
//! - **City of Melbourne open data**: public toilets export and the
//!   buildings-with-accessibility dataset
//!
//! Every failure, whether a transport error, a non-success status or an
//! undecodable body, is reported as [`HomeFreeError::Upstream`]. Requests are
//! issued once; there are no retries.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::config::UpstreamConfig;
use crate::error::{HomeFreeError, Result};
use crate::geo::Coordinate;
use crate::overpass::{accessibility_query, parse_count_response, CountElement};
use crate::resolver::Record;

const USER_AGENT: &str = concat!("homefree/", env!("CARGO_PKG_VERSION"));

/// Async client for the Overpass and Melbourne open-data APIs.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HomeFreeError::Config`] if the HTTP client cannot be built
    /// (e.g., due to TLS initialization failure).
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HomeFreeError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// The upstream configuration in use.
    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Count accessibility features within `radius_meters` of `center`.
    ///
    /// # Errors
    ///
    /// Returns [`HomeFreeError::Upstream`] if Overpass is unreachable or
    /// answers with a non-success status.
    pub async fn count_accessibility_features(
        &self,
        center: Coordinate,
        radius_meters: u32,
    ) -> Result<Vec<CountElement>> {
        let url = &self.config.overpass_url;
        let query = accessibility_query(center, radius_meters);

        tracing::debug!(
            lat = center.lat,
            lon = center.lon,
            radius = radius_meters,
            "Querying Overpass"
        );

        let response = self.send_json(self.client.post(url).body(query), url).await?;
        Ok(parse_count_response(&response))
    }

    /// Fetch the raw public toilets export.
    ///
    /// # Errors
    ///
    /// Returns [`HomeFreeError::Upstream`] on any upstream failure.
    pub async fn fetch_mobility(&self) -> Result<Value> {
        let url = &self.config.mobility_url;
        tracing::debug!(url = %url, "Fetching mobility data");
        self.send_json(self.client.get(url), url).await
    }

    /// Fetch up to `building_limit` building records.
    ///
    /// A response without a `results` array yields no records.
    ///
    /// # Errors
    ///
    /// Returns [`HomeFreeError::Upstream`] on any upstream failure.
    pub async fn fetch_buildings(&self) -> Result<Vec<Record>> {
        let url = &self.config.buildings_url;
        tracing::debug!(url = %url, limit = self.config.building_limit, "Fetching buildings");

        let request = self
            .client
            .get(url)
            .query(&[("limit", self.config.building_limit)]);
        let response = self.send_json(request, url).await?;

        let records: Vec<Record> = response
            .get("results")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| row.as_object().cloned())
                    .collect()
            })
            .unwrap_or_default();

        tracing::debug!(records = records.len(), "Fetched buildings");
        Ok(records)
    }

    /// Send a request and decode its JSON body.
    async fn send_json(&self, request: RequestBuilder, url: &str) -> Result<Value> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Upstream request failed");
            HomeFreeError::upstream(url, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "Upstream returned error status");
            return Err(HomeFreeError::upstream(url, format!("HTTP {}", status)));
        }

        response.json::<Value>().await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Upstream response was not valid JSON");
            HomeFreeError::upstream(url, format!("Invalid JSON response: {}", e))
        })
    }
}
