//! Generic feed sources for the Prediction Market Edge Radar
//!
//! Provider-agnostic `DataSource` implementations: RSS/Atom news feeds and
//! plain JSON-over-HTTP endpoints. Provider-specific scrapers live outside
//! this workspace and plug in through the same contract.

pub mod json;
pub mod rss_source;

pub use json::JsonSource;
pub use rss_source::{curated_feeds, FeedItem, RssFeed, RssSource};
