//! The engine's mutable state and its phase enum.

use crate::error::FetchError;
use crate::source::{Cursor, Item};

/// Which kind of load a fetch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    /// First page or refresh; the result replaces the list.
    Initial,
    /// Continuation page; the result is appended.
    More,
}

/// What the engine is doing right now.
///
/// Anything other than [`Phase::Idle`] means exactly one fetch is
/// outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    LoadingInitial,
    LoadingMore,
}

impl Phase {
    pub fn is_idle(self) -> bool {
        self == Phase::Idle
    }

    /// The load kind in progress, if any.
    pub fn load_kind(self) -> Option<LoadKind> {
        match self {
            Phase::Idle => None,
            Phase::LoadingInitial => Some(LoadKind::Initial),
            Phase::LoadingMore => Some(LoadKind::More),
        }
    }
}

impl From<LoadKind> for Phase {
    fn from(kind: LoadKind) -> Self {
        match kind {
            LoadKind::Initial => Phase::LoadingInitial,
            LoadKind::More => Phase::LoadingMore,
        }
    }
}

/// Everything the engine tracks.  Only [`FeedEngine`](super::FeedEngine)
/// writes it; everyone else gets `&EngineState` or a clone.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineState {
    pub(super) items: Vec<Item>,
    pub(super) phase: Phase,
    pub(super) has_more: bool,
    pub(super) last_error: Option<FetchError>,
    pub(super) cursor: Option<Cursor>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            phase: Phase::Idle,
            has_more: true,
            last_error: None,
            cursor: None,
        }
    }
}

impl EngineState {
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_and_open_ended() {
        let state = EngineState::default();
        assert!(state.items().is_empty());
        assert!(state.phase().is_idle());
        assert!(state.has_more());
        assert!(state.last_error().is_none());
        assert!(state.cursor().is_none());
    }

    #[test]
    fn phase_maps_to_load_kind() {
        assert_eq!(Phase::Idle.load_kind(), None);
        assert_eq!(Phase::from(LoadKind::Initial), Phase::LoadingInitial);
        assert_eq!(Phase::LoadingMore.load_kind(), Some(LoadKind::More));
    }
}
