//! The value types shared by every feed source and the pagination engine.
//!
//! An [`Item`] is one entry in the feed; its payload is a [`ContentVariant`].
//! Sources build items, the engine owns them afterwards, and the UI only ever
//! sees them through read-only borrows or clones.
//!
//! ## For contributors
//!
//! [`ContentVariant`] is matched exhaustively by the renderer (`ui.rs`) and by
//! the headless printer (`headless.rs`).  Adding a variant is a breaking change:
//! the compiler will point at every consumer that has to learn about it.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// The person (or feed) an item is attributed to.
///
/// Items hold an `Arc<Author>` so a page full of posts by the same author
/// shares one allocation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    pub id: String,
    pub display_name: String,
    /// Opaque reference to an avatar image (usually a URL).  Never loaded by
    /// this crate.
    pub avatar_ref: String,
}

impl Author {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        avatar_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            avatar_ref: avatar_ref.into(),
        }
    }
}

/// The payload of an [`Item`].
///
/// Each case carries only its own fields.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ContentVariant {
    Text {
        text: String,
    },
    Image {
        image_ref: String,
        caption: String,
    },
    Video {
        thumbnail_ref: String,
        video_ref: String,
        caption: String,
    },
}

impl ContentVariant {
    /// Short lowercase tag, used in logs and by the headless printer.
    pub fn tag(&self) -> &'static str {
        match self {
            ContentVariant::Text { .. } => "text",
            ContentVariant::Image { .. } => "image",
            ContentVariant::Video { .. } => "video",
        }
    }
}

/// A single feed entry.
///
/// Immutable once constructed.  `id` is unique within a session; the engine
/// does not check that, ordering and uniqueness are the source's job.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Item {
    pub id: String,
    pub author: Arc<Author>,
    pub body: ContentVariant,
    pub created_at: DateTime<Utc>,
}

/// Opaque continuation token handed out by a source and passed back to it.
///
/// Only the source that produced a cursor knows how to read it.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of results, consumed once by the engine.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
    /// Token for the next page, if the source has one.
    pub cursor: Option<Cursor>,
    pub has_more: bool,
}

impl Page {
    pub fn new(items: Vec<Item>, cursor: Option<Cursor>, has_more: bool) -> Self {
        Self {
            items,
            cursor,
            has_more,
        }
    }

    /// The terminal page: no items and nothing further.
    pub fn empty(cursor: Option<Cursor>) -> Self {
        Self::new(Vec::new(), cursor, false)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_item(id: &str, body: ContentVariant) -> Item {
        Item {
            id: id.to_string(),
            author: Arc::new(Author::new("u1", "User 1", "avatar://u1")),
            body,
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn variant_tags_are_stable() {
        let text = ContentVariant::Text { text: "hi".into() };
        let image = ContentVariant::Image {
            image_ref: "img://1".into(),
            caption: "c".into(),
        };
        let video = ContentVariant::Video {
            thumbnail_ref: "img://t".into(),
            video_ref: "vid://1".into(),
            caption: "c".into(),
        };

        assert_eq!(text.tag(), "text");
        assert_eq!(image.tag(), "image");
        assert_eq!(video.tag(), "video");
    }

    #[test]
    fn items_share_author() {
        let author = Arc::new(Author::new("u1", "User 1", "avatar://u1"));
        let a = Item {
            author: Arc::clone(&author),
            ..make_item("a", ContentVariant::Text { text: "a".into() })
        };
        let b = Item {
            author: Arc::clone(&author),
            ..make_item("b", ContentVariant::Text { text: "b".into() })
        };

        assert!(Arc::ptr_eq(&a.author, &b.author));
        assert_eq!(Arc::strong_count(&author), 3);
    }

    #[test]
    fn empty_page_reports_no_more() {
        let page = Page::empty(Some(Cursor::new("7")));
        assert!(page.items.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.cursor.as_ref().map(Cursor::as_str), Some("7"));
    }

    #[test]
    fn cursor_displays_its_token() {
        assert_eq!(Cursor::new("offset:40").to_string(), "offset:40");
    }
}
