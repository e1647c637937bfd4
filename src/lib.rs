//! scrollfeed: an infinite-scroll feed client.
//!
//! # Architecture
//!
//! ```text
//!   ┌──────────┐  trigger_*()   ┌──────────────┐  fetch(cursor)  ┌────────────┐
//!   │ input.rs │ ─────────────► │  FeedEngine  │ ──────────────► │ FeedSource │
//!   └──────────┘                │ (engine/)    │ ◄────────────── │ (source/)  │
//!        ▲                      └──────┬───────┘   completion    └────────────┘
//!        │ key events                  │ FeedObserver
//!   ┌────┴─────┐   FeedEvent    ┌──────▼───────┐
//!   │ main.rs  │ ◄───────────── │ mpsc channel │
//!   │ (loop)   │                └──────────────┘
//!   └────┬─────┘
//!        │ draw
//!   ┌────▼─────┐
//!   │  ui.rs   │
//!   └──────────┘
//! ```
//!
//! The engine owns all pagination state and only mutates it on the task that
//! owns it. Fetches run on spawned tokio tasks and report back through a
//! completion channel that the owner drains once per tick (or awaits, in
//! headless mode).
//!
//! - [`source`]: the [`FeedSource`](source::FeedSource) trait, item model and
//!   the mock and RSS sources.
//! - [`engine`]: the single-flight pagination state machine and observers.
//! - [`app`], [`ui`], [`input`]: the terminal front end.
//! - [`headless`]: print pages to stdout without a terminal.
//! - [`config`], [`logging`], [`error`]: ambient plumbing.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod headless;
pub mod input;
pub mod logging;
pub mod source;
pub mod ui;
