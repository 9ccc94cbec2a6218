//! Plug-in registry for data sources, processors, and detectors
//!
//! The registry is an explicit, constructed object handed to the
//! orchestrator, so independent pipelines (and tests) can coexist in one
//! process. It performs no dependency validation: plug-ins may be registered
//! in any order, and a detector naming a source that was never registered
//! simply observes that input as absent at run time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use radar_core::{Edge, Market, RadarResult};

use crate::data::SourceData;

/// Broad classification of what a source provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceCategory {
    /// Tradable market listings; values must deserialize as `Vec<Market>`
    Markets,
    /// Order book / trade flow data
    OrderFlow,
    /// News and press coverage
    News,
    /// Company financials, transcripts, filings
    Financials,
    /// Slow-moving reference data
    Reference,
}

impl std::fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceCategory::Markets => write!(f, "markets"),
            SourceCategory::OrderFlow => write!(f, "orderflow"),
            SourceCategory::News => write!(f, "news"),
            SourceCategory::Financials => write!(f, "financials"),
            SourceCategory::Reference => write!(f, "reference"),
        }
    }
}

/// A named, cached external-data provider.
///
/// `fetch` is the only side-effecting operation and typically performs a
/// network call; it must return a plain, serializable value and must not
/// mutate shared state.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Process-wide unique name; identity for caching and dependency wiring
    fn name(&self) -> &str;

    fn category(&self) -> SourceCategory;

    /// How long a fetched value stays fresh. Heterogeneous per source:
    /// fast-moving order books run minutes, quarterly transcripts run a day.
    fn ttl(&self) -> Duration;

    async fn fetch(&self) -> RadarResult<Value>;
}

/// A pipeline stage that derives new data from one or more sources.
///
/// The result is merged into the run's data map under `output_key`, visible
/// to detectors as if it were another source. Declared inputs that were
/// never fetched are observed as absent, not as an error.
pub trait Processor: Send + Sync {
    fn name(&self) -> &str;

    fn input_source_names(&self) -> Vec<String>;

    fn output_key(&self) -> &str;

    fn process(&self, inputs: &SourceData) -> RadarResult<Value>;
}

/// A pipeline stage that turns data into candidate trading signals.
///
/// `detect` must be a pure function of its inputs. Every emitted edge must
/// carry `edge >= min_edge()`; the aggregator relies on that contract.
#[async_trait]
pub trait Detector: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn required_source_names(&self) -> Vec<String>;

    /// Smallest edge magnitude this detector will report
    fn min_edge(&self) -> Decimal;

    async fn detect(&self, data: &SourceData, markets: &[Market]) -> RadarResult<Vec<Edge>>;
}

/// Holds the plug-in declarations for one pipeline
#[derive(Default)]
pub struct PipelineRegistry {
    sources: HashMap<String, Arc<dyn DataSource>>,
    processors: HashMap<String, Arc<dyn Processor>>,
    detectors: HashMap<String, Arc<dyn Detector>>,
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source. Re-registering a name replaces the prior plug-in,
    /// which lets tests hot-swap implementations.
    pub fn register_source(&mut self, source: Arc<dyn DataSource>) {
        self.sources.insert(source.name().to_string(), source);
    }

    /// Register a processor; last write wins by name.
    pub fn register_processor(&mut self, processor: Arc<dyn Processor>) {
        self.processors
            .insert(processor.name().to_string(), processor);
    }

    /// Register a detector; last write wins by name.
    pub fn register_detector(&mut self, detector: Arc<dyn Detector>) {
        self.detectors.insert(detector.name().to_string(), detector);
    }

    /// Look up a single source by name, for ad-hoc fetches outside a run
    pub fn source(&self, name: &str) -> Option<Arc<dyn DataSource>> {
        self.sources.get(name).cloned()
    }

    pub fn sources(&self) -> Vec<Arc<dyn DataSource>> {
        self.sources.values().cloned().collect()
    }

    pub fn processors(&self) -> Vec<Arc<dyn Processor>> {
        self.processors.values().cloned().collect()
    }

    pub fn detectors(&self) -> Vec<Arc<dyn Detector>> {
        self.detectors.values().cloned().collect()
    }

    /// Names of sources in the given category, sorted for determinism
    pub fn source_names_in_category(&self, category: SourceCategory) -> Vec<String> {
        let mut names: Vec<String> = self
            .sources
            .values()
            .filter(|s| s.category() == category)
            .map(|s| s.name().to_string())
            .collect();
        names.sort();
        names
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }

    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StaticSource {
        name: &'static str,
        value: Value,
    }

    #[async_trait]
    impl DataSource for StaticSource {
        fn name(&self) -> &str {
            self.name
        }

        fn category(&self) -> SourceCategory {
            SourceCategory::Reference
        }

        fn ttl(&self) -> Duration {
            Duration::from_secs(300)
        }

        async fn fetch(&self) -> RadarResult<Value> {
            Ok(self.value.clone())
        }
    }

    #[tokio::test]
    async fn registration_is_last_write_wins() {
        let mut registry = PipelineRegistry::new();
        registry.register_source(Arc::new(StaticSource {
            name: "prices",
            value: json!(1),
        }));
        registry.register_source(Arc::new(StaticSource {
            name: "prices",
            value: json!(2),
        }));

        assert_eq!(registry.source_count(), 1);
        let source = registry.source("prices").unwrap();
        assert_eq!(source.fetch().await.unwrap(), json!(2));
    }

    #[test]
    fn unknown_source_is_a_miss_not_an_error() {
        let registry = PipelineRegistry::new();
        assert!(registry.source("never-registered").is_none());
    }

    #[test]
    fn category_listing_is_sorted() {
        let mut registry = PipelineRegistry::new();
        registry.register_source(Arc::new(StaticSource {
            name: "zeta",
            value: json!(null),
        }));
        registry.register_source(Arc::new(StaticSource {
            name: "alpha",
            value: json!(null),
        }));

        assert_eq!(
            registry.source_names_in_category(SourceCategory::Reference),
            vec!["alpha".to_string(), "zeta".to_string()]
        );
    }
}
