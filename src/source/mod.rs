//! Feed source abstraction layer.
//!
//! This module defines the [`FeedSource`] trait and the item model the engine
//! works with.  Concrete sources live in sub-modules: [`mock`] generates
//! synthetic posts, [`rss`] pages through a real RSS channel.
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `atom.rs`).
//! 2. Define a struct (e.g. `AtomSource`) and implement [`FeedSource`] for it.
//! 3. Add `mod atom;` below and re-export your struct in the `pub use` block.
//! 4. Construct it in `build_source` in `main.rs`.
//!
//! The engine, UI and headless runner are all source-agnostic.

mod item;
mod mock;
mod rss;

pub use item::{Author, ContentVariant, Cursor, Item, Page};
pub use mock::{MockSource, MockSourceConfig};
pub use rss::RssSource;

use async_trait::async_trait;

use crate::error::FetchError;

/// Trait that every feed source must implement.
///
/// The engine calls [`fetch()`](FeedSource::fetch) from a spawned tokio task,
/// so implementations must be `Send + Sync`.  At most one call is outstanding
/// per engine at any time.
///
/// ## Contract
///
/// * `cursor == None` asks for the first page.
/// * `cursor == Some(c)` asks for the page after the one that returned `c`.
/// * Items are returned in the order they should be shown.
/// * Repeated calls with the same cursor may return different content.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Human-readable label shown in the status bar.
    fn name(&self) -> &str;

    /// Fetch one page.
    async fn fetch(&self, cursor: Option<Cursor>) -> Result<Page, FetchError>;
}
