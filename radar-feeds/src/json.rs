//! Generic JSON-over-HTTP source
//!
//! Fetches a configured URL and hands back the response body as JSON. This
//! is how market-universe endpoints are wired in without provider-specific
//! client code: point a `Markets`-category `JsonSource` at an endpoint that
//! serves the canonical market list shape.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use radar_core::{RadarError, RadarResult};
use radar_pipeline::{DataSource, SourceCategory};

pub struct JsonSource {
    name: String,
    url: String,
    category: SourceCategory,
    ttl: Duration,
    client: Client,
}

impl JsonSource {
    pub fn new(name: &str, url: &str, category: SourceCategory, ttl: Duration) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            category,
            ttl,
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

#[async_trait]
impl DataSource for JsonSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> SourceCategory {
        self.category
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn fetch(&self) -> RadarResult<Value> {
        let response = self
            .client
            .get(&self.url)
            .header("User-Agent", "EdgeRadar/1.0")
            .send()
            .await
            .map_err(|e| RadarError::network(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(RadarError::api(format!(
                "{} returned {}",
                self.url,
                response.status()
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| RadarError::parse(format!("Invalid JSON from {}: {}", self.url, e)))?;

        debug!("Fetched JSON payload from {}", self.name);
        Ok(value)
    }
}
