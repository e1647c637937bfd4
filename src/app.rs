use ratatui::widgets::ListState;

use crate::engine::{FeedEvent, LoadKind};
use crate::source::Item;

/// Display-side mirror of the engine state plus scroll position.
///
/// Fed exclusively by [`FeedEvent`]s, so it never reaches into the engine.
pub struct App {
    /// Items in display order, as last published by the engine.
    pub items: Vec<Item>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status message.
    pub status: String,
    /// The load in progress, if any.
    pub loading: Option<LoadKind>,
    pub has_more: bool,
    /// Label of the feed source, shown as the list title.
    pub source_name: String,
    prefetch_threshold: usize,
    /// Set by navigation, cleared once a load-more is requested or fails.
    /// Only a fresh scroll may ask for the next page.
    prefetch_armed: bool,
}

impl App {
    pub fn new(source_name: impl Into<String>, prefetch_threshold: usize) -> Self {
        Self {
            items: Vec::new(),
            list_state: ListState::default(),
            quit: false,
            status: "Starting…".into(),
            loading: None,
            has_more: true,
            source_name: source_name.into(),
            prefetch_threshold,
            prefetch_armed: false,
        }
    }

    /// Fold one engine notification into the view state.
    pub fn apply_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::ItemsChanged(items) => {
                // A replace arrives while the initial load is still marked
                // as running; jump back to the top for it.
                let replaced = self.loading == Some(LoadKind::Initial);
                self.items = items;
                self.status = format!("Loaded {} items", self.items.len());

                if self.items.is_empty() {
                    self.list_state.select(None);
                } else if replaced || self.list_state.selected().is_none() {
                    self.list_state.select(Some(0));
                }
            }
            FeedEvent::LoadingChanged { is_loading, kind } => {
                if is_loading {
                    self.loading = Some(kind);
                    self.status = match kind {
                        LoadKind::Initial => "Loading…".into(),
                        LoadKind::More => "Loading more…".into(),
                    };
                } else {
                    self.loading = None;
                }
            }
            FeedEvent::HasMoreChanged(has_more) => {
                self.has_more = has_more;
                if !has_more {
                    self.status = "End of feed".into();
                }
            }
            FeedEvent::Error(err) => {
                self.prefetch_armed = false;
                self.status = format!("Error: {}", err.reason);
            }
        }
    }

    /// Whether the user has scrolled close enough to the bottom to ask for
    /// the next page.
    pub fn wants_more(&self) -> bool {
        if !self.prefetch_armed
            || self.items.is_empty()
            || !self.has_more
            || self.loading.is_some()
        {
            return false;
        }
        match self.list_state.selected() {
            Some(i) => {
                let remaining = self.items.len().saturating_sub(1).saturating_sub(i);
                remaining <= self.prefetch_threshold
            }
            None => false,
        }
    }

    /// Called once a load-more has been requested for the current scroll
    /// position; the next one needs another navigation.
    pub fn disarm_prefetch(&mut self) {
        self.prefetch_armed = false;
    }

    fn select(&mut self, index: usize) {
        self.list_state.select(Some(index));
        self.prefetch_armed = true;
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.items.len() - 1),
            None => 0,
        };
        self.select(i);
    }

    pub fn select_previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.select(i);
    }

    pub fn select_first(&mut self) {
        if !self.items.is_empty() {
            self.select(0);
        }
    }

    pub fn select_last(&mut self) {
        if !self.items.is_empty() {
            self.select(self.items.len() - 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::FetchError;
    use crate::source::{Author, ContentVariant};
    use chrono::{TimeZone, Utc};

    fn make_item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            author: Arc::new(Author::new("u", "User", "")),
            body: ContentVariant::Text { text: id.to_string() },
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn sample_items(n: usize) -> Vec<Item> {
        (0..n).map(|i| make_item(&i.to_string())).collect()
    }

    fn loaded_app(n: usize) -> App {
        let mut app = App::new("test", 2);
        app.apply_event(FeedEvent::ItemsChanged(sample_items(n)));
        app
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn new_app_starts_empty() {
        let app = App::new("test", 3);
        assert!(app.items.is_empty());
        assert!(!app.quit);
        assert!(app.has_more);
        assert!(app.loading.is_none());
        assert!(app.list_state.selected().is_none());
    }

    // -- apply_event ---------------------------------------------------------

    #[test]
    fn first_items_select_top() {
        let app = loaded_app(3);
        assert_eq!(app.items.len(), 3);
        assert_eq!(app.list_state.selected(), Some(0));
        assert_eq!(app.status, "Loaded 3 items");
    }

    #[test]
    fn appended_items_keep_selection() {
        let mut app = loaded_app(3);
        app.select_last();
        app.apply_event(FeedEvent::LoadingChanged {
            is_loading: true,
            kind: LoadKind::More,
        });
        app.apply_event(FeedEvent::ItemsChanged(sample_items(6)));

        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn replaced_items_jump_to_top() {
        let mut app = loaded_app(5);
        app.select_last();
        app.apply_event(FeedEvent::LoadingChanged {
            is_loading: true,
            kind: LoadKind::Initial,
        });
        app.apply_event(FeedEvent::ItemsChanged(sample_items(4)));
        app.apply_event(FeedEvent::LoadingChanged {
            is_loading: false,
            kind: LoadKind::Initial,
        });

        assert_eq!(app.list_state.selected(), Some(0));
        assert!(app.loading.is_none());
    }

    #[test]
    fn exhaustion_and_errors_update_status() {
        let mut app = loaded_app(2);
        app.apply_event(FeedEvent::HasMoreChanged(false));
        assert!(!app.has_more);
        assert_eq!(app.status, "End of feed");

        app.apply_event(FeedEvent::Error(FetchError::new("timeout")));
        assert_eq!(app.status, "Error: timeout");
        assert_eq!(app.items.len(), 2, "errors never touch the list");
    }

    // -- wants_more ----------------------------------------------------------

    #[test]
    fn wants_more_near_the_end_only() {
        let mut app = loaded_app(10);
        app.select_next();
        assert!(!app.wants_more(), "top of a long list");

        for _ in 0..6 {
            app.select_next();
        }
        assert_eq!(app.list_state.selected(), Some(7));
        assert!(app.wants_more());
    }

    #[test]
    fn wants_more_needs_a_scroll() {
        let mut app = loaded_app(2);
        assert_eq!(app.list_state.selected(), Some(0));
        assert!(!app.wants_more(), "a fresh list has not been scrolled");

        app.select_previous();
        assert!(app.wants_more());

        app.disarm_prefetch();
        assert!(!app.wants_more());
    }

    #[test]
    fn failed_load_more_waits_for_navigation() {
        let mut app = loaded_app(3);
        app.select_last();
        assert!(app.wants_more());

        app.disarm_prefetch();
        app.apply_event(FeedEvent::LoadingChanged {
            is_loading: true,
            kind: LoadKind::More,
        });
        app.apply_event(FeedEvent::LoadingChanged {
            is_loading: false,
            kind: LoadKind::More,
        });
        app.apply_event(FeedEvent::Error(FetchError::new("timeout")));

        assert!(app.loading.is_none());
        assert!(app.has_more);
        assert!(!app.wants_more(), "a failure is not retried on its own");

        app.select_last();
        assert!(app.wants_more());
    }

    #[test]
    fn error_disarms_prefetch_even_without_disarm_call() {
        let mut app = loaded_app(3);
        app.select_last();
        app.apply_event(FeedEvent::Error(FetchError::new("boom")));
        assert!(!app.wants_more());
    }

    #[test]
    fn huge_prefetch_threshold_does_not_overflow() {
        let mut app = App::new("test", usize::MAX);
        app.apply_event(FeedEvent::ItemsChanged(sample_items(3)));
        app.select_next();
        assert!(app.wants_more());

        app.select_last();
        assert!(app.wants_more());
    }

    #[test]
    fn zero_threshold_waits_for_the_last_item() {
        let mut app = App::new("test", 0);
        app.apply_event(FeedEvent::ItemsChanged(sample_items(3)));
        app.select_next();
        assert!(!app.wants_more());
        app.select_next();
        assert!(app.wants_more());
    }

    #[test]
    fn wants_more_respects_loading_and_exhaustion() {
        let mut app = loaded_app(3);
        app.select_last();
        assert!(app.wants_more());

        app.apply_event(FeedEvent::LoadingChanged {
            is_loading: true,
            kind: LoadKind::More,
        });
        assert!(!app.wants_more());

        app.apply_event(FeedEvent::LoadingChanged {
            is_loading: false,
            kind: LoadKind::More,
        });
        app.apply_event(FeedEvent::HasMoreChanged(false));
        assert!(!app.wants_more());
    }

    #[test]
    fn wants_more_is_false_when_empty() {
        let app = App::new("test", 3);
        assert!(!app.wants_more());
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn navigation_on_empty_is_noop() {
        let mut app = App::new("test", 3);
        app.select_next();
        app.select_previous();
        app.select_first();
        app.select_last();
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn select_next_advances_and_clamps() {
        let mut app = loaded_app(3);
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(1));
        app.select_next();
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn select_previous_moves_up_and_clamps() {
        let mut app = loaded_app(3);
        app.select_last();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(1));
        app.select_first();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(0));
    }
}
