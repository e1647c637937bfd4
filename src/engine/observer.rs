//! Change notifications pushed from the engine to its subscribers.
//!
//! Observers are called synchronously on the task that owns the engine, in
//! a fixed order whenever several things change at once:
//!
//! 1. items changed
//! 2. loading changed
//! 3. has-more changed
//! 4. error
//!
//! Subscribers that live elsewhere (the TUI's [`App`](crate::app::App), a
//! test) can register an `mpsc::UnboundedSender<FeedEvent>` instead of
//! implementing the trait themselves.

use tokio::sync::mpsc;

use super::state::LoadKind;
use crate::error::FetchError;
use crate::source::Item;

/// Receiver of engine notifications.  Every method defaults to a no-op so an
/// observer only overrides what it cares about.
pub trait FeedObserver {
    /// The item list was replaced or extended.  `items` is the full list.
    fn on_items_changed(&mut self, _items: &[Item]) {}

    /// A fetch started (`true`) or finished (`false`).
    fn on_loading_changed(&mut self, _is_loading: bool, _kind: LoadKind) {}

    fn on_has_more_changed(&mut self, _has_more: bool) {}

    fn on_error(&mut self, _error: &FetchError) {}
}

/// An owned copy of one notification, for channel delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    ItemsChanged(Vec<Item>),
    LoadingChanged { is_loading: bool, kind: LoadKind },
    HasMoreChanged(bool),
    Error(FetchError),
}

/// Forwarding is best-effort; a dropped receiver is ignored.
impl FeedObserver for mpsc::UnboundedSender<FeedEvent> {
    fn on_items_changed(&mut self, items: &[Item]) {
        let _ = self.send(FeedEvent::ItemsChanged(items.to_vec()));
    }

    fn on_loading_changed(&mut self, is_loading: bool, kind: LoadKind) {
        let _ = self.send(FeedEvent::LoadingChanged { is_loading, kind });
    }

    fn on_has_more_changed(&mut self, has_more: bool) {
        let _ = self.send(FeedEvent::HasMoreChanged(has_more));
    }

    fn on_error(&mut self, error: &FetchError) {
        let _ = self.send(FeedEvent::Error(error.clone()));
    }
}

/// Handle returned by [`FeedEngine::subscribe`](super::FeedEngine::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The set of notifications produced by one engine step.
#[derive(Debug, Default)]
pub(super) struct Changes {
    pub items_changed: bool,
    pub loading: Option<(bool, LoadKind)>,
    pub has_more: Option<bool>,
    pub error: Option<FetchError>,
}

impl Changes {
    pub fn loading(is_loading: bool, kind: LoadKind) -> Self {
        Self {
            loading: Some((is_loading, kind)),
            ..Self::default()
        }
    }
}

#[derive(Default)]
pub(super) struct Observers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Box<dyn FeedObserver>)>,
}

impl Observers {
    pub fn subscribe(&mut self, observer: Box<dyn FeedObserver>) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Deliver `changes` to every observer, in subscription order.
    pub fn notify(&mut self, changes: &Changes, items: &[Item]) {
        for (_, observer) in &mut self.entries {
            if changes.items_changed {
                observer.on_items_changed(items);
            }
            if let Some((is_loading, kind)) = changes.loading {
                observer.on_loading_changed(is_loading, kind);
            }
            if let Some(has_more) = changes.has_more {
                observer.on_has_more_changed(has_more);
            }
            if let Some(error) = &changes.error {
                observer.on_error(error);
            }
        }
    }
}
