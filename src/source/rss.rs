//! RSS feed source implementation.
//!
//! An RSS channel is a single document, so this source downloads it on a
//! first-page request and then serves the parsed items in fixed-size slices.
//! A refresh (cursor `None`) downloads the channel again.
//!
//! ## For contributors — adding a new source type
//!
//! 1. Create a new file under `src/source/` (e.g. `atom.rs`).
//! 2. Define a struct that holds any configuration your source needs (URL,
//!    API key, etc.).
//! 3. Implement [`FeedSource`] for your struct — `name()` returns a label and
//!    `fetch()` returns one [`Page`].
//! 4. Re-export your struct from `src/source/mod.rs`.
//!
//! The RSS implementation below is a complete worked example.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{Author, ContentVariant, Cursor, FeedSource, Item, Page};
use crate::error::FetchError;

/// An RSS feed data source.
///
/// Fetches and parses an RSS 2.0 feed over HTTP using the [`rss`] crate.
pub struct RssSource {
    /// The feed URL to download.
    pub url: String,
    /// A human-readable label shown in the status bar.
    pub label: String,
    page_size: usize,
    /// Items of the most recent download, in channel order.
    cache: Mutex<Vec<Item>>,
}

impl RssSource {
    /// Create a new RSS source.
    ///
    /// # Arguments
    ///
    /// * `url` — full URL of the RSS feed (e.g.
    ///   `https://feeds.bbci.co.uk/news/rss.xml`).
    /// * `label` — short name displayed in the TUI for this feed.
    /// * `page_size` — items per page; clamped to at least one.
    pub fn new(url: impl Into<String>, label: impl Into<String>, page_size: usize) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
            page_size: page_size.max(1),
            cache: Mutex::new(Vec::new()),
        }
    }

    /// Parse an already-fetched [`rss::Channel`] into [`Item`]s.
    ///
    /// This is a pure function (no I/O) so that tests can exercise the
    /// mapping without hitting the network.  `fetched_at` stands in for
    /// items without a parseable `<pubDate>`.
    pub fn parse_channel(
        channel: &rss::Channel,
        label: &str,
        fetched_at: DateTime<Utc>,
    ) -> Vec<Item> {
        let avatar_ref = channel.image().map(|i| i.url().to_string()).unwrap_or_default();
        let channel_author = Arc::new(Author::new(
            channel.link(),
            channel.title(),
            avatar_ref.clone(),
        ));

        channel
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| {
                // Prefer <guid>, fall back to <link>, then the position.
                let id = item
                    .guid()
                    .map(|g| g.value().to_string())
                    .or_else(|| item.link().map(String::from))
                    .unwrap_or_else(|| format!("{label}#{index}"));

                let author = item
                    .author()
                    .map(String::from)
                    .or_else(|| {
                        item.dublin_core_ext()
                            .and_then(|dc| dc.creators().first().cloned())
                    })
                    .map(|name| Arc::new(Author::new(name.clone(), name, avatar_ref.clone())))
                    .unwrap_or_else(|| Arc::clone(&channel_author));

                // Parse RFC-2822 date; gracefully degrade to fetch time.
                let created_at = item
                    .pub_date()
                    .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or(fetched_at);

                Item {
                    id,
                    author,
                    body: Self::body_for(item, &avatar_ref),
                    created_at,
                }
            })
            .collect()
    }

    /// Map an item to a content variant by its enclosure MIME type.
    fn body_for(item: &rss::Item, channel_image: &str) -> ContentVariant {
        let title = item.title().unwrap_or("(untitled)");

        match item.enclosure() {
            Some(enc) if enc.mime_type().starts_with("image/") => ContentVariant::Image {
                image_ref: enc.url().to_string(),
                caption: title.to_string(),
            },
            Some(enc) if enc.mime_type().starts_with("video/") => ContentVariant::Video {
                thumbnail_ref: channel_image.to_string(),
                video_ref: enc.url().to_string(),
                caption: title.to_string(),
            },
            _ => ContentVariant::Text {
                text: match item.description() {
                    Some(desc) if !desc.trim().is_empty() => format!("{title}\n{}", desc.trim()),
                    _ => title.to_string(),
                },
            },
        }
    }

    /// Slice `items` into the page starting at `offset`.
    fn page_at(&self, items: &[Item], offset: usize) -> Page {
        if offset >= items.len() {
            return Page::empty(Some(Cursor::new(offset.to_string())));
        }

        let end = (offset + self.page_size).min(items.len());
        Page::new(
            items[offset..end].to_vec(),
            Some(Cursor::new(end.to_string())),
            end < items.len(),
        )
    }

    async fn download(&self) -> Result<rss::Channel, FetchError> {
        let body = reqwest::get(&self.url)
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(rss::Channel::read_from(body.as_ref())?)
    }
}

#[async_trait]
impl FeedSource for RssSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch(&self, cursor: Option<Cursor>) -> Result<Page, FetchError> {
        match cursor {
            None => {
                let channel = self.download().await?;
                let items = Self::parse_channel(&channel, &self.label, Utc::now());
                info!(url = %self.url, count = items.len(), "downloaded rss channel");

                let page = self.page_at(&items, 0);
                *self.cache.lock().await = items;
                Ok(page)
            }
            Some(c) => {
                let offset = c
                    .as_str()
                    .parse::<usize>()
                    .map_err(|_| FetchError::new(format!("invalid cursor '{c}'")))?;
                let items = self.cache.lock().await;
                debug!(offset, cached = items.len(), "serving rss page from cache");
                Ok(self.page_at(&items, offset))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
