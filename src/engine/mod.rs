//! The pagination engine.
//!
//! [`FeedEngine`] owns the item list and the loading / exhaustion / error
//! flags, and is the only thing allowed to change them.  Triggers return
//! immediately; the fetch runs on a spawned tokio task and its outcome comes
//! back over a channel that the owner drains on its own task:
//!
//! ```text
//!  trigger_*() ──► guard ──► tokio::spawn(source.fetch) ──┐
//!                                                          │ Completion
//!  drain_completions() / settle() ◄── mpsc channel ◄──────┘
//!        │
//!        └──► mutate EngineState ──► notify observers
//! ```
//!
//! ## Single flight
//!
//! `phase` is checked and set synchronously inside the trigger, on the owning
//! task, so a second trigger while a fetch is outstanding is rejected rather
//! than queued.  Every dispatch is tagged with a fresh generation number and
//! a completion is only applied if it carries the generation of the fetch
//! currently in flight; anything else (a result that raced a
//! [`cancel`](FeedEngine::cancel)) is dropped.
//!
//! ## Liveness
//!
//! Each fetch is bounded by [`EngineConfig::fetch_timeout`] and can be
//! abandoned with [`FeedEngine::cancel`].  A refresh does not preempt an
//! outstanding load-more; call `cancel()` first if that is what you want.

mod observer;
mod state;

pub use observer::{FeedEvent, FeedObserver, SubscriptionId};
pub use state::{EngineState, LoadKind, Phase};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::source::{Cursor, FeedSource, Item, Page};
use observer::{Changes, Observers};

/// Engine tunables.  Page size is a source concern and lives there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Upper bound on a single fetch.  `None` waits forever.
    pub fetch_timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Some(Duration::from_secs(10)),
        }
    }
}

/// Bookkeeping for the one fetch that may be outstanding.
#[derive(Debug)]
struct InFlight {
    generation: u64,
    kind: LoadKind,
    cancel: CancellationToken,
}

/// A finished fetch on its way back to the owning task.
#[derive(Debug)]
struct Completion {
    generation: u64,
    result: Result<Page, FetchError>,
}

/// Single-flight pagination state machine over a [`FeedSource`].
///
/// Must be driven from inside a tokio runtime: triggers spawn the fetch.
pub struct FeedEngine {
    source: Arc<dyn FeedSource>,
    config: EngineConfig,
    state: EngineState,
    in_flight: Option<InFlight>,
    next_generation: u64,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    observers: Observers,
}

impl FeedEngine {
    pub fn new(source: Arc<dyn FeedSource>, config: EngineConfig) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            source,
            config,
            state: EngineState::default(),
            in_flight: None,
            next_generation: 0,
            completion_tx,
            completion_rx,
            observers: Observers::default(),
        }
    }

    // -- subscriptions -------------------------------------------------------

    /// Register an observer.  It receives every notification from now on.
    pub fn subscribe(&mut self, observer: Box<dyn FeedObserver>) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    /// Remove an observer.  Returns `false` if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    // -- read-only view ------------------------------------------------------

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// An owned copy of the current state.
    pub fn snapshot(&self) -> EngineState {
        self.state.clone()
    }

    pub fn items(&self) -> &[Item] {
        self.state.items()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_loading(&self) -> bool {
        !self.state.phase().is_idle()
    }

    pub fn has_more(&self) -> bool {
        self.state.has_more()
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.state.last_error()
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.state.cursor()
    }

    // -- triggers ------------------------------------------------------------

    /// Load the first page, replacing whatever is shown.
    ///
    /// Returns `true` if a fetch was dispatched, `false` if the guard
    /// rejected the trigger.
    pub fn trigger_initial_load(&mut self) -> bool {
        self.trigger_replace("initial_load")
    }

    /// Same as [`trigger_initial_load`](Self::trigger_initial_load).  A
    /// previous error does not block it; an outstanding fetch does.
    pub fn trigger_refresh(&mut self) -> bool {
        self.trigger_replace("refresh")
    }

    /// Append the next page.  Ignored while loading or once exhausted.
    pub fn trigger_load_more(&mut self) -> bool {
        if !self.guard_idle("load_more") {
            return false;
        }
        if !self.state.has_more {
            debug!("load_more ignored: feed exhausted");
            return false;
        }

        let cursor = self.state.cursor.clone();
        self.dispatch(LoadKind::More, cursor);
        true
    }

    /// Abandon the outstanding fetch, if any.
    ///
    /// The phase returns to idle and observers see loading-changed(false).
    /// Items, `has_more` and `last_error` are untouched, and the abandoned
    /// result is never applied.
    pub fn cancel(&mut self) -> bool {
        let Some(in_flight) = self.in_flight.take() else {
            return false;
        };

        in_flight.cancel.cancel();
        self.state.phase = Phase::Idle;
        info!(generation = in_flight.generation, kind = ?in_flight.kind, "fetch cancelled");

        self.observers
            .notify(&Changes::loading(false, in_flight.kind), &self.state.items);
        true
    }

    // -- completions ---------------------------------------------------------

    /// Apply every completion that has already arrived, without waiting.
    ///
    /// Meant to be called once per tick of a UI loop.  Returns how many
    /// completions changed the state (stale ones are not counted).
    pub fn drain_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            if self.apply(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the outstanding fetch to finish and apply it.
    ///
    /// Returns immediately with `false` when nothing is in flight.
    pub async fn settle(&mut self) -> bool {
        while self.in_flight.is_some() {
            let Some(completion) = self.completion_rx.recv().await else {
                break;
            };
            if self.apply(completion) {
                return true;
            }
        }
        false
    }

    // -- internals -----------------------------------------------------------

    fn guard_idle(&self, action: &str) -> bool {
        match &self.in_flight {
            Some(in_flight) => {
                debug!(
                    action,
                    generation = in_flight.generation,
                    loading = ?self.state.phase.load_kind(),
                    "trigger ignored: fetch already in flight"
                );
                false
            }
            None => true,
        }
    }

    fn trigger_replace(&mut self, action: &str) -> bool {
        if !self.guard_idle(action) {
            return false;
        }
        self.dispatch(LoadKind::Initial, None);
        true
    }

    fn dispatch(&mut self, kind: LoadKind, cursor: Option<Cursor>) {
        self.next_generation += 1;
        let generation = self.next_generation;
        let cancel = CancellationToken::new();

        self.state.phase = Phase::from(kind);
        self.in_flight = Some(InFlight {
            generation,
            kind,
            cancel: cancel.clone(),
        });
        info!(
            generation,
            ?kind,
            cursor = cursor.as_ref().map(Cursor::as_str),
            source = self.source.name(),
            "dispatching fetch"
        );

        self.observers
            .notify(&Changes::loading(true, kind), &self.state.items);

        let source = Arc::clone(&self.source);
        let timeout = self.config.fetch_timeout;
        let tx = self.completion_tx.clone();

        tokio::spawn(async move {
            // The fetch runs in its own task so a panicking source still
            // produces a completion.
            let fetch = tokio::spawn(run_fetch(source, cursor, timeout));
            let abort = fetch.abort_handle();

            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    abort.abort();
                    return;
                }
                joined = fetch => joined.unwrap_or_else(|err| {
                    Err(FetchError::new(format!("fetch task failed: {err}")))
                }),
            };

            // The receiver lives as long as the engine; if it is gone the
            // engine was dropped and nobody cares.
            let _ = tx.send(Completion { generation, result });
        });
    }

    /// Apply one completion.  Returns `false` for a stale one.
    fn apply(&mut self, completion: Completion) -> bool {
        let kind = match self.in_flight.take() {
            Some(in_flight) if in_flight.generation == completion.generation => in_flight.kind,
            other => {
                self.in_flight = other;
                debug!(
                    generation = completion.generation,
                    "dropping stale fetch result"
                );
                return false;
            }
        };

        self.state.phase = Phase::Idle;
        let had_more = self.state.has_more;
        let mut changes = Changes::loading(false, kind);

        match completion.result {
            Ok(page) => {
                let received = page.items.len();
                self.state.last_error = None;
                self.state.cursor = page.cursor;

                match kind {
                    LoadKind::Initial => {
                        self.state.has_more = page.has_more && !page.items.is_empty();
                        self.state.items = page.items;
                        changes.items_changed = true;
                    }
                    LoadKind::More if page.items.is_empty() => {
                        self.state.has_more = false;
                    }
                    LoadKind::More => {
                        self.state.has_more = page.has_more;
                        self.state.items.extend(page.items);
                        changes.items_changed = true;
                    }
                }

                info!(
                    generation = completion.generation,
                    ?kind,
                    received,
                    total = self.state.items.len(),
                    has_more = self.state.has_more,
                    "fetch applied"
                );
            }
            Err(err) => {
                warn!(
                    generation = completion.generation,
                    ?kind,
                    error = %err,
                    "fetch failed"
                );
                self.state.last_error = Some(err.clone());
                changes.error = Some(err);
            }
        }

        if self.state.has_more != had_more {
            changes.has_more = Some(self.state.has_more);
        }

        self.observers.notify(&changes, &self.state.items);
        true
    }
}

impl Drop for FeedEngine {
    fn drop(&mut self) {
        if let Some(in_flight) = &self.in_flight {
            in_flight.cancel.cancel();
        }
    }
}

async fn run_fetch(
    source: Arc<dyn FeedSource>,
    cursor: Option<Cursor>,
    timeout: Option<Duration>,
) -> Result<Page, FetchError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, source.fetch(cursor))
            .await
            .unwrap_or_else(|_| Err(FetchError::timeout(limit))),
        None => source.fetch(cursor).await,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
