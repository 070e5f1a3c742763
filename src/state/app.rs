use serde::{Deserialize, Serialize};

use crate::model::{PlaybackModes, QueueState, Song};

/// Everything a UI panel can observe. One live instance per client, owned
/// by the [`Store`](super::Store), which is its only writer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub playlist: PlaylistState,
    pub upnext: UpNextState,
    /// True iff the user explicitly paused. Distinguishes intentional pause
    /// from a transient pause caused by a source swap.
    pub user_paused: bool,
    pub player: PlayerState,
    pub ui: UiState,
}

impl AppState {
    /// Song at the playlist cursor, if any is selected.
    pub fn current_song(&self) -> Option<&Song> {
        usize::try_from(self.playlist.current_index)
            .ok()
            .and_then(|index| self.playlist.items.get(index))
    }
}

/// Active playlist; also the payload of the playlist routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistState {
    #[serde(default)]
    pub name: String,
    pub size: usize,
    /// Index of the selected song, -1 when none is selected.
    pub current_index: i64,
    pub items: Vec<Song>,
    #[serde(default)]
    pub queue: QueueState,
    #[serde(default)]
    pub modes: PlaybackModes,
}

impl Default for PlaylistState {
    fn default() -> Self {
        Self {
            name: String::new(),
            size: 0,
            current_index: -1,
            items: Vec::new(),
            queue: QueueState::default(),
            modes: PlaybackModes::default(),
        }
    }
}

/// Lookahead view; also the payload of the up-next route. The first
/// `queue_count` items come from the manual queue, the rest follow playlist
/// order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpNextState {
    pub current: Option<Song>,
    pub items: Vec<Song>,
    pub queue_count: usize,
    #[serde(default)]
    pub modes: PlaybackModes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub is_playing: bool,
    /// Seconds from the start of the current song.
    pub current_time: f64,
    pub duration: f64,
    /// In `[0, 1]`.
    pub volume: f32,
    pub muted: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
            muted: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UiState {
    pub loading: bool,
    pub error: Option<String>,
}
