//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] navigation and [`FeedEngine`]
//! triggers.  Adding a new keybinding is a single match arm in
//! [`handle_key_event`].
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] (or use an engine trigger) for the action.
//! 2. Add a `KeyCode` match arm in [`handle_key_event`] that calls it.
//! 3. Update the help text in `draw_status_bar` in `ui.rs`.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;
use crate::engine::FeedEngine;

/// Process a single key event, updating app state or triggering the engine.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, engine: &mut FeedEngine, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Char('r') => {
            if !engine.trigger_refresh() {
                app.status = "Busy, press c to cancel the current load".into();
            }
        }
        KeyCode::Char('m') => {
            engine.trigger_load_more();
        }
        KeyCode::Char('c') => {
            if engine.cancel() {
                app.status = "Cancelled".into();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::{EngineConfig, Phase};
    use crate::source::{MockSource, MockSourceConfig};
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn engine() -> FeedEngine {
        FeedEngine::new(
            Arc::new(MockSource::new("mock", MockSourceConfig::default())),
            EngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn q_quits() {
        let mut app = App::new("mock", 3);
        let mut engine = engine();
        handle_key_event(&mut app, &mut engine, press(KeyCode::Char('q')));
        assert!(app.quit);
    }

    #[tokio::test]
    async fn release_events_are_ignored() {
        let mut app = App::new("mock", 3);
        let mut engine = engine();
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        handle_key_event(&mut app, &mut engine, key);
        assert!(!app.quit);
    }

    #[tokio::test]
    async fn r_refreshes_and_c_cancels() {
        let mut app = App::new("mock", 3);
        let mut engine = engine();

        handle_key_event(&mut app, &mut engine, press(KeyCode::Char('r')));
        assert_eq!(engine.phase(), Phase::LoadingInitial);

        handle_key_event(&mut app, &mut engine, press(KeyCode::Char('r')));
        assert!(app.status.starts_with("Busy"));

        handle_key_event(&mut app, &mut engine, press(KeyCode::Char('c')));
        assert!(engine.phase().is_idle());
        assert_eq!(app.status, "Cancelled");
    }

    #[tokio::test]
    async fn m_loads_more() {
        let mut app = App::new("mock", 3);
        let mut engine = engine();
        handle_key_event(&mut app, &mut engine, press(KeyCode::Char('m')));
        assert_eq!(engine.phase(), Phase::LoadingMore);
    }
}
