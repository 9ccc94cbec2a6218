//! RSS/Atom feed source
//!
//! Fetches and parses one configured feed into a JSON array of news items.
//! Registered per feed, so every feed gets its own cache entry and TTL.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use radar_core::{RadarError, RadarResult};
use radar_pipeline::{DataSource, SourceCategory};

/// Articles older than this are dropped at parse time
const MAX_ARTICLE_AGE_DAYS: i64 = 7;

/// RSS feed definition
#[derive(Debug, Clone)]
pub struct RssFeed {
    /// Name of the source; doubles as the registry source name
    pub name: String,
    /// RSS feed URL
    pub url: String,
    /// Category tags for relevance matching
    pub categories: Vec<String>,
}

impl RssFeed {
    pub fn new(name: &str, url: &str, categories: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            categories: categories.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Default feed list for a fresh deployment
pub fn curated_feeds() -> Vec<RssFeed> {
    vec![
        RssFeed::new(
            "AP News",
            "https://feedx.net/rss/ap.xml",
            &["general", "politics", "world"],
        ),
        RssFeed::new(
            "BBC World",
            "https://feeds.bbci.co.uk/news/world/rss.xml",
            &["world", "politics", "general"],
        ),
        RssFeed::new(
            "The Hill",
            "https://thehill.com/feed/",
            &["politics", "elections", "government"],
        ),
        RssFeed::new(
            "CoinDesk",
            "https://www.coindesk.com/arc/outboundfeeds/rss/",
            &["crypto", "bitcoin", "ethereum"],
        ),
        RssFeed::new(
            "ESPN",
            "https://www.espn.com/espn/rss/news",
            &["sports", "nfl", "nba"],
        ),
    ]
}

/// A parsed news article in the shape news-category sources emit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    /// Stable id derived from the article URL
    pub id: String,
    pub title: String,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub summary: String,
    pub categories: Vec<String>,
}

/// `DataSource` implementation for one RSS/Atom feed
pub struct RssSource {
    feed: RssFeed,
    client: Client,
    ttl: Duration,
}

impl RssSource {
    pub fn new(feed: RssFeed, ttl: Duration) -> Self {
        Self {
            feed,
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            ttl,
        }
    }

    /// Share one HTTP client across many feed sources
    pub fn with_client(feed: RssFeed, client: Client, ttl: Duration) -> Self {
        Self { feed, client, ttl }
    }
}

#[async_trait]
impl DataSource for RssSource {
    fn name(&self) -> &str {
        &self.feed.name
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::News
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn fetch(&self) -> RadarResult<Value> {
        let response = self
            .client
            .get(&self.feed.url)
            .header("User-Agent", "EdgeRadar/1.0")
            .send()
            .await
            .map_err(|e| RadarError::network(format!("Feed request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(RadarError::api(format!(
                "Feed {} returned {}",
                self.feed.url,
                response.status()
            )));
        }

        let content = response
            .bytes()
            .await
            .map_err(|e| RadarError::network(format!("Feed body read failed: {}", e)))?;

        let items = parse_feed(&content, &self.feed)?;
        debug!("Parsed {} items from {}", items.len(), self.feed.name);

        serde_json::to_value(items).map_err(|e| RadarError::parse(e.to_string()))
    }
}

/// Try RSS first, then Atom
pub fn parse_feed(content: &[u8], feed: &RssFeed) -> RadarResult<Vec<FeedItem>> {
    if let Ok(channel) = rss::Channel::read_from(content) {
        return Ok(parse_rss_channel(&channel, feed));
    }

    if let Ok(atom_feed) = atom_syndication::Feed::read_from(content) {
        return Ok(parse_atom_feed(&atom_feed, feed));
    }

    Err(RadarError::parse(format!(
        "Failed to parse feed: {}",
        feed.url
    )))
}

fn parse_rss_channel(channel: &rss::Channel, feed: &RssFeed) -> Vec<FeedItem> {
    channel
        .items()
        .iter()
        .filter_map(|item| {
            let title = item.title()?.to_string();
            let url = item.link()?.to_string();

            let published_at = item
                .pub_date()
                .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                .map(|d| d.with_timezone(&Utc))
                .or_else(|| extract_date_from_url(&url))
                .unwrap_or_else(Utc::now);

            if (Utc::now() - published_at).num_days() > MAX_ARTICLE_AGE_DAYS {
                return None;
            }

            let summary = strip_html(item.description().unwrap_or_default());

            Some(FeedItem {
                id: item_id(&url),
                title,
                url: url.clone(),
                source: extract_source(&url, &feed.name),
                published_at,
                summary,
                categories: feed.categories.clone(),
            })
        })
        .collect()
}

fn parse_atom_feed(atom_feed: &atom_syndication::Feed, feed: &RssFeed) -> Vec<FeedItem> {
    atom_feed
        .entries()
        .iter()
        .filter_map(|entry| {
            let title = entry.title().to_string();
            let url = entry.links().first().map(|l| l.href().to_string())?;

            let published_at = entry
                .published()
                .copied()
                .unwrap_or_else(|| *entry.updated())
                .with_timezone(&Utc);

            if (Utc::now() - published_at).num_days() > MAX_ARTICLE_AGE_DAYS {
                return None;
            }

            let summary_html = entry.summary().map(|s| s.as_str()).unwrap_or_default();
            let content_html = entry.content().and_then(|c| c.value()).unwrap_or_default();
            let summary = if !summary_html.is_empty() {
                strip_html(summary_html)
            } else {
                strip_html(content_html)
            };

            Some(FeedItem {
                id: item_id(&url),
                title,
                url: url.clone(),
                source: extract_source(&url, &feed.name),
                published_at,
                summary,
                categories: feed.categories.clone(),
            })
        })
        .collect()
}

/// Stable short id from the article URL
fn item_id(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(&hasher.finalize()[..8])
}

/// Outlet name from the article URL's host, falling back to the feed name
fn extract_source(article_url: &str, feed_name: &str) -> String {
    url::Url::parse(article_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| feed_name.to_string())
}

/// Publication date embedded in the article path, e.g. /2026/08/04/ or
/// /2026-08-04-
fn extract_date_from_url(url: &str) -> Option<DateTime<Utc>> {
    let slash_pattern = regex::Regex::new(r"/(\d{4})/(\d{1,2})/(\d{1,2})/").ok()?;
    let dash_pattern = regex::Regex::new(r"[/-](\d{4})-(\d{2})-(\d{2})[/-]").ok()?;

    let captures = slash_pattern
        .captures(url)
        .or_else(|| dash_pattern.captures(url))?;

    let year: i32 = captures.get(1)?.as_str().parse().ok()?;
    let month: u32 = captures.get(2)?.as_str().parse().ok()?;
    let day: u32 = captures.get(3)?.as_str().parse().ok()?;

    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).single()
}

/// Drop tags, decode common entities, collapse whitespace
fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed() -> RssFeed {
        RssFeed::new("Test Wire", "https://example.com/rss.xml", &["general"])
    }

    fn rss_fixture(pub_date: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Wire</title>
    <link>https://example.com</link>
    <description>Test</description>
    <item>
      <title>Senate passes the measure</title>
      <link>https://news.example.com/articles/senate-measure</link>
      <description>&lt;p&gt;The &lt;b&gt;measure&lt;/b&gt;   passed.&lt;/p&gt;</description>
      <pubDate>{}</pubDate>
    </item>
  </channel>
</rss>"#,
            pub_date
        )
    }

    #[test]
    fn parses_rss_items() {
        let xml = rss_fixture(&Utc::now().to_rfc2822());
        let items = parse_feed(xml.as_bytes(), &feed()).unwrap();

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.title, "Senate passes the measure");
        assert_eq!(item.source, "news.example.com");
        assert_eq!(item.summary, "The measure passed.");
        assert_eq!(item.id, item_id("https://news.example.com/articles/senate-measure"));
    }

    #[test]
    fn drops_articles_older_than_a_week() {
        let old = (Utc::now() - chrono::Duration::days(10)).to_rfc2822();
        let items = parse_feed(rss_fixture(&old).as_bytes(), &feed()).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn parses_atom_feeds() {
        let updated = Utc::now().to_rfc3339();
        let xml = format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Test Atom</title>
  <id>urn:test</id>
  <updated>{updated}</updated>
  <entry>
    <title>Court ruling expected</title>
    <id>urn:entry</id>
    <updated>{updated}</updated>
    <link href="https://example.org/ruling"/>
    <summary>A ruling is expected soon.</summary>
  </entry>
</feed>"#,
        );

        let items = parse_feed(xml.as_bytes(), &feed()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Court ruling expected");
        assert_eq!(items[0].source, "example.org");
    }

    #[test]
    fn unparseable_content_is_an_error() {
        assert!(parse_feed(b"not xml at all", &feed()).is_err());
    }

    #[test]
    fn curated_feed_names_are_unique_source_names() {
        let feeds = curated_feeds();
        let mut names: Vec<&str> = feeds.iter().map(|f| f.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), feeds.len());
    }

    #[test]
    fn strip_html_collapses_whitespace() {
        assert_eq!(
            strip_html("<p>A   <b>bold</b>\nclaim &amp; more</p>"),
            "A bold claim & more"
        );
    }

    #[test]
    fn extracts_dates_from_article_urls() {
        let date = extract_date_from_url("https://example.com/2026/08/04/story").unwrap();
        assert_eq!(
            date.date_naive(),
            chrono::NaiveDate::from_ymd_opt(2026, 8, 4).unwrap()
        );
        assert!(extract_date_from_url("https://example.com/story").is_none());
    }
}
