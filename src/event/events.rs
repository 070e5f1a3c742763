use std::fmt;

use crate::state::{AppState, PlayerState, PlaylistState, StatePatch, UpNextState};

/// Named events the store produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Every non-silent state update.
    StateChanged,
    PlaylistChanged,
    UpNextChanged,
    PlayerChanged,
    /// Initial load finished (playlist, up-next and modes fetched).
    AppInitialized,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StateChanged => "state_changed",
            Self::PlaylistChanged => "playlist_changed",
            Self::UpNextChanged => "upnext_changed",
            Self::PlayerChanged => "player_changed",
            Self::AppInitialized => "app_initialized",
        };
        f.write_str(name)
    }
}

/// Payload of the generic state-changed event.
#[derive(Debug, Clone)]
pub struct StateChange {
    pub previous: AppState,
    pub current: AppState,
    /// The raw patch that was applied.
    pub changes: StatePatch,
}

/// Typed payloads, one variant per event kind. Targeted events carry the
/// post-merge sub-tree.
#[derive(Debug, Clone)]
pub enum Notification {
    State(StateChange),
    Playlist(PlaylistState),
    UpNext(UpNextState),
    Player(PlayerState),
    Initialized,
}
