//! Synthetic feed source.
//!
//! Produces pages of randomly mixed text / image / video posts after an
//! artificial delay, so the engine and UI can be exercised without a network.
//! Useful for demos and as a second worked example of [`FeedSource`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use rand::Rng;
use tracing::debug;
use uuid::Uuid;

use super::{Author, ContentVariant, Cursor, FeedSource, Item, Page};
use crate::error::FetchError;

/// Tunables for [`MockSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct MockSourceConfig {
    /// Items per page.
    pub page_size: usize,
    /// Latency of the first page.
    pub initial_delay: Duration,
    /// Latency of every continuation page.
    pub more_delay: Duration,
    /// Pages served before the source reports exhaustion.  `None` never runs
    /// dry.
    pub max_pages: Option<u32>,
    /// Probability in `0.0..=1.0` that a fetch fails.
    pub failure_rate: f64,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            initial_delay: Duration::from_millis(1500),
            more_delay: Duration::from_millis(2000),
            max_pages: None,
            failure_rate: 0.0,
        }
    }
}

/// A [`FeedSource`] that invents its content.
///
/// The cursor is the index of the next page, rendered as a decimal string.
pub struct MockSource {
    label: String,
    config: MockSourceConfig,
}

impl MockSource {
    pub fn new(label: impl Into<String>, config: MockSourceConfig) -> Self {
        Self {
            label: label.into(),
            config,
        }
    }

    /// Build one page worth of posts.  Pure apart from randomness, so tests
    /// can call it without waiting for the delay.
    pub fn generate_posts(page_index: u32, page_size: usize) -> Vec<Item> {
        let mut rng = rand::thread_rng();
        let now = Utc::now();
        let first = page_index as usize * page_size;

        (first..first + page_size)
            .map(|n| {
                let author = Arc::new(Author::new(
                    format!("user_{n}"),
                    format!("User {n}"),
                    format!("https://placehold.co/100x100/EFEFEF/333333?text=U{n}"),
                ));

                let body = match rng.gen_range(0..3) {
                    1 => ContentVariant::Image {
                        image_ref: "https://placehold.co/600x400/CCCCCC/333333?text=Image".into(),
                        caption: "An interesting image caption. #scenery".into(),
                    },
                    2 => ContentVariant::Video {
                        thumbnail_ref: "https://placehold.co/600x400/AAAAAA/FFFFFF?text=Video"
                            .into(),
                        video_ref: "about:blank".into(),
                        caption: "A cool video preview. #fun".into(),
                    },
                    _ => ContentVariant::Text {
                        text: format!(
                            "This is a sample text post. It can have a variable amount of \
                             text, which the UI needs to handle gracefully. Post number {n}."
                        ),
                    },
                };

                Item {
                    id: Uuid::new_v4().to_string(),
                    author,
                    body,
                    created_at: now - ChronoDuration::hours(n as i64),
                }
            })
            .collect()
    }

    fn should_fail(&self) -> bool {
        let rate = self.config.failure_rate.clamp(0.0, 1.0);
        rate > 0.0 && rand::thread_rng().gen_bool(rate)
    }
}

#[async_trait]
impl FeedSource for MockSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch(&self, cursor: Option<Cursor>) -> Result<Page, FetchError> {
        let (page_index, delay) = match &cursor {
            None => (0, self.config.initial_delay),
            Some(c) => {
                let index = c
                    .as_str()
                    .parse::<u32>()
                    .map_err(|_| FetchError::new(format!("invalid cursor '{c}'")))?;
                (index, self.config.more_delay)
            }
        };

        tokio::time::sleep(delay).await;

        if self.should_fail() {
            return Err(FetchError::new("simulated network failure"));
        }

        if self.config.max_pages.is_some_and(|max| page_index >= max) {
            debug!(page_index, "mock source exhausted");
            return Ok(Page::empty(cursor));
        }

        let items = Self::generate_posts(page_index, self.config.page_size);
        debug!(page_index, count = items.len(), "mock source produced page");
        Ok(Page::new(
            items,
            Some(Cursor::new((page_index + 1).to_string())),
            true,
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchErrorKind;

    fn instant_config() -> MockSourceConfig {
        MockSourceConfig {
            initial_delay: Duration::ZERO,
            more_delay: Duration::ZERO,
            ..MockSourceConfig::default()
        }
    }

    #[test]
    fn generates_requested_page_size() {
        let posts = MockSource::generate_posts(0, 20);
        assert_eq!(posts.len(), 20);
        assert_eq!(posts[0].author.id, "user_0");
        assert_eq!(posts[19].author.id, "user_19");
    }

    #[test]
    fn later_pages_continue_numbering_and_get_older() {
        let posts = MockSource::generate_posts(2, 5);
        assert_eq!(posts[0].author.display_name, "User 10");
        assert!(posts[0].created_at > posts[4].created_at);
    }

    #[test]
    fn ids_are_unique() {
        let posts = MockSource::generate_posts(0, 50);
        let mut ids: Vec<_> = posts.iter().map(|p| p.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[tokio::test]
    async fn first_page_hands_out_next_cursor() {
        let source = MockSource::new("mock", instant_config());
        let page = source.fetch(None).await.unwrap();

        assert_eq!(page.items.len(), 20);
        assert!(page.has_more);
        assert_eq!(page.cursor, Some(Cursor::new("1")));
    }

    #[tokio::test]
    async fn exhausts_after_max_pages() {
        let source = MockSource::new(
            "mock",
            MockSourceConfig {
                max_pages: Some(1),
                ..instant_config()
            },
        );

        let last = source.fetch(Some(Cursor::new("1"))).await.unwrap();
        assert!(last.items.is_empty());
        assert!(!last.has_more);
    }

    #[tokio::test]
    async fn rejects_foreign_cursor() {
        let source = MockSource::new("mock", instant_config());
        let err = source
            .fetch(Some(Cursor::new("offset:3")))
            .await
            .expect_err("non-numeric cursor must fail");
        assert_eq!(err.kind, FetchErrorKind::Source);
    }

    #[tokio::test]
    async fn always_fails_at_full_failure_rate() {
        let source = MockSource::new(
            "mock",
            MockSourceConfig {
                failure_rate: 1.0,
                ..instant_config()
            },
        );
        let err = source.fetch(None).await.expect_err("must fail");
        assert_eq!(err.reason, "simulated network failure");
    }

    #[test]
    fn name_returns_label() {
        let src = MockSource::new("Demo", MockSourceConfig::default());
        assert_eq!(src.name(), "Demo");
    }
}
