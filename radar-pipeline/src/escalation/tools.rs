//! Read-only query tools for analysis tiers
//!
//! An analyst gets its market context through these lookups over the run's
//! data snapshot. All queries are side-effect-free; the one exception is
//! `fetch_source`, the ad-hoc single-source pull, which goes through the
//! registry and the shared cache read path exactly like the orchestrator.

use std::sync::Arc;

use serde_json::Value;

use radar_core::{Market, RadarError, RadarResult};

use crate::cache::{CacheStatus, SourceCache};
use crate::data::SourceData;
use crate::registry::{PipelineRegistry, SourceCategory};

/// A news article surfaced by a keyword lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsMention {
    pub title: String,
    pub url: String,
    pub source: String,
}

/// Query surface handed to `MarketAnalyst` implementations
pub struct ResearchTools {
    data: Arc<SourceData>,
    markets: Arc<Vec<Market>>,
    registry: Arc<PipelineRegistry>,
    cache: Arc<SourceCache>,
}

impl ResearchTools {
    pub fn new(
        data: Arc<SourceData>,
        markets: Arc<Vec<Market>>,
        registry: Arc<PipelineRegistry>,
        cache: Arc<SourceCache>,
    ) -> Self {
        Self {
            data,
            markets,
            registry,
            cache,
        }
    }

    /// The canonical market universe for this run
    pub fn markets(&self) -> &[Market] {
        &self.markets
    }

    /// Raw value for a source or processor output key
    pub fn source_value(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Markets whose title contains the query, title-prefix matches first
    pub fn find_markets(&self, query: &str, limit: usize) -> Vec<&Market> {
        let query_lower = query.to_lowercase();
        let mut results: Vec<&Market> = self
            .markets
            .iter()
            .filter(|m| m.title.to_lowercase().contains(&query_lower))
            .collect();

        results.sort_by(|a, b| {
            let a_starts = a.title.to_lowercase().starts_with(&query_lower);
            let b_starts = b.title.to_lowercase().starts_with(&query_lower);
            match (a_starts, b_starts) {
                (true, false) => std::cmp::Ordering::Less,
                (false, true) => std::cmp::Ordering::Greater,
                _ => a.title.cmp(&b.title),
            }
        });

        results.truncate(limit);
        results
    }

    /// Articles across all news-category sources whose title mentions the
    /// keyword
    pub fn news_mentioning(&self, keyword: &str, limit: usize) -> Vec<NewsMention> {
        let keyword_lower = keyword.to_lowercase();
        let mut mentions = Vec::new();

        for name in self.registry.source_names_in_category(SourceCategory::News) {
            let Some(Value::Array(items)) = self.data.get(&name) else {
                continue;
            };
            for item in items {
                let Some(title) = item.get("title").and_then(Value::as_str) else {
                    continue;
                };
                if !title.to_lowercase().contains(&keyword_lower) {
                    continue;
                }
                mentions.push(NewsMention {
                    title: title.to_string(),
                    url: item
                        .get("url")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    source: item
                        .get("source")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                });
                if mentions.len() >= limit {
                    return mentions;
                }
            }
        }

        mentions
    }

    /// Pull one named source on demand, outside the full run cycle.
    ///
    /// Serves a fresh cache entry when available; otherwise fetches and
    /// caches. An unregistered name is a permanent miss.
    pub async fn fetch_source(&self, name: &str) -> RadarResult<Value> {
        if let Some((value, CacheStatus::Fresh)) = self.cache.get(name) {
            return Ok(value);
        }

        let source = self
            .registry
            .source(name)
            .ok_or_else(|| RadarError::not_found(format!("source not registered: {}", name)))?;

        let value = source.fetch().await?;
        self.cache.put(name, value.clone(), source.ttl());
        Ok(value)
    }
}
