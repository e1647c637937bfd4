//! scrollfeed binary: parse args, load config, set up logging and the
//! terminal, and run the event loop (or the headless printer).

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::info;

use scrollfeed::app::App;
use scrollfeed::config::{AppConfig, SourceKind};
use scrollfeed::engine::FeedEngine;
use scrollfeed::logging::{self, LogTarget};
use scrollfeed::source::{FeedSource, MockSource, RssSource};
use scrollfeed::{headless, input, ui};

#[derive(Parser)]
#[command(name = "scrollfeed")]
#[command(version, about = "An infinite-scroll feed client for the terminal")]
struct Cli {
    /// RSS feed URL (switches the source to rss)
    url: Option<String>,

    /// Path to a config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the synthetic mock source
    #[arg(long, conflicts_with = "url")]
    mock: bool,

    /// Items per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Print pages to stdout instead of starting the TUI
    #[arg(long)]
    headless: bool,

    /// Continuation pages to fetch in headless mode
    #[arg(long, default_value_t = 1)]
    pages: u32,
}

impl Cli {
    /// Layer command-line overrides on top of the config file.
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(url) = &self.url {
            config.source.kind = SourceKind::Rss;
            config.source.url = url.clone();
        }
        if self.mock {
            config.source.kind = SourceKind::Mock;
        }
        if let Some(page_size) = self.page_size {
            config.source.page_size = page_size;
        }
    }
}

// ---------------------------------------------------------------------------
// Terminal guard: restores the terminal on drop
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the default panic message is printed.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

fn build_source(config: &AppConfig) -> Arc<dyn FeedSource> {
    let src = &config.source;
    match src.kind {
        SourceKind::Mock => Arc::new(MockSource::new(&src.label, config.mock_config())),
        SourceKind::Rss => Arc::new(RssSource::new(&src.url, &src.label, src.page_size)),
    }
}

/// Fetches run on the runtime's workers; the TUI loop stays on the main
/// thread, where blocking on terminal input stalls nothing.
fn build_runtime() -> io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;

    let runtime = build_runtime()?;
    let _runtime_guard = runtime.enter();

    let engine = FeedEngine::new(build_source(&config), config.engine_config());

    if cli.headless {
        logging::init(&config.log_level, LogTarget::Stderr)?;
        return runtime.block_on(headless::run(engine, cli.pages));
    }

    let log_path = logging::init(&config.log_level, LogTarget::File(&AppConfig::data_dir()))?;
    info!(log = ?log_path, source = engine.source_name(), "starting tui");
    run_tui(&config, engine)
}

fn run_tui(config: &AppConfig, mut engine: FeedEngine) -> Result<()> {
    install_panic_hook();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    engine.subscribe(Box::new(event_tx));

    let mut app = App::new(engine.source_name(), config.ui.prefetch_threshold);
    engine.trigger_initial_load();

    // -- terminal setup (restored when `guard` drops) ------------------------
    let mut guard = TerminalGuard::new()?;

    // Each iteration:
    //   1. Apply finished fetches and fold the resulting events into `app`.
    //   2. Ask for the next page if the user scrolled near the bottom.
    //   3. Render the UI.
    //   4. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(config.ui.tick_rate_ms);

    loop {
        engine.drain_completions();
        while let Ok(event) = event_rx.try_recv() {
            app.apply_event(event);
        }

        if app.wants_more() {
            app.disarm_prefetch();
            engine.trigger_load_more();
        }

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, &mut engine, key);
            }
        }

        if app.quit {
            break;
        }
    }

    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
