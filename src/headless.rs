//! Non-interactive mode: load a few pages and print them to stdout.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use tracing::{debug, info, warn};

use crate::engine::{FeedEngine, FeedObserver, LoadKind};
use crate::error::FetchError;
use crate::source::{ContentVariant, Item};

/// One summary line per item.
pub fn format_item(item: &Item) -> String {
    let summary = match &item.body {
        ContentVariant::Text { text } => text.lines().next().unwrap_or_default(),
        ContentVariant::Image { caption, .. } => caption.as_str(),
        ContentVariant::Video { caption, .. } => caption.as_str(),
    };
    format!(
        "{}  {:<16} [{:<5}] {}",
        item.created_at.format("%Y-%m-%d %H:%M"),
        item.author.display_name,
        item.body.tag(),
        summary
    )
}

/// First write error hit by a [`Printer`], shared with whoever drives it.
pub type WriteFailure = Arc<Mutex<Option<io::Error>>>;

/// Observer that writes items to a sink as they arrive.
///
/// After the first failed write (a closed pipe, usually) it stops writing
/// and records the error in its [`WriteFailure`].
pub struct Printer<W: Write> {
    out: W,
    printed: usize,
    failure: WriteFailure,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            failure: WriteFailure::default(),
        }
    }

    /// Handle to the recorded write error, readable after the printer has
    /// been handed to the engine.
    pub fn failure(&self) -> WriteFailure {
        Arc::clone(&self.failure)
    }

    fn record(&self, err: io::Error) {
        if let Ok(mut slot) = self.failure.lock() {
            slot.get_or_insert(err);
        }
    }

    fn has_failed(&self) -> bool {
        self.failure.lock().map(|slot| slot.is_some()).unwrap_or(true)
    }
}

impl<W: Write> FeedObserver for Printer<W> {
    fn on_items_changed(&mut self, items: &[Item]) {
        // A replace restarts the listing.
        if items.len() < self.printed {
            self.printed = 0;
        }
        if self.has_failed() {
            return;
        }
        for item in &items[self.printed..] {
            if let Err(err) = writeln!(self.out, "{}", format_item(item)) {
                self.record(err);
                return;
            }
        }
        if let Err(err) = self.out.flush() {
            self.record(err);
            return;
        }
        self.printed = items.len();
    }

    fn on_loading_changed(&mut self, is_loading: bool, kind: LoadKind) {
        if is_loading {
            info!(?kind, "loading");
        }
    }

    fn on_error(&mut self, error: &FetchError) {
        warn!(reason = %error.reason, "fetch failed");
    }
}

/// Load the first page plus up to `pages` continuation pages.
///
/// Stops early when stdout goes away; a broken pipe is a normal way to end
/// (`scrollfeed --headless | head`), any other write error is returned.
pub async fn run(engine: FeedEngine, pages: u32) -> Result<()> {
    run_with(engine, pages, io::stdout()).await
}

async fn run_with<W: Write + 'static>(mut engine: FeedEngine, pages: u32, out: W) -> Result<()> {
    let printer = Printer::new(out);
    let failure = printer.failure();
    engine.subscribe(Box::new(printer));

    engine.trigger_initial_load();
    engine.settle().await;
    if let Some(err) = engine.last_error() {
        bail!("initial load from {} failed: {}", engine.source_name(), err.reason);
    }

    for _ in 0..pages {
        if output_closed(&failure)? || !engine.trigger_load_more() {
            break;
        }
        engine.settle().await;
        if engine.last_error().is_some() {
            break;
        }
    }
    output_closed(&failure)?;

    info!(
        total = engine.items().len(),
        has_more = engine.has_more(),
        "headless run finished"
    );
    Ok(())
}

/// `Ok(true)` once the printer hit a broken pipe; other write errors are
/// returned as-is.
fn output_closed(failure: &WriteFailure) -> Result<bool> {
    let Ok(slot) = failure.lock() else {
        bail!("printer state poisoned");
    };
    match slot.as_ref() {
        None => Ok(false),
        Some(err) if err.kind() == io::ErrorKind::BrokenPipe => {
            debug!("output closed, stopping");
            Ok(true)
        }
        Some(err) => bail!("writing output: {err}"),
    }
}
