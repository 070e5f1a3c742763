//! Typed partial updates.
//!
//! A field left `None` preserves the existing value; a present field
//! replaces it. Nested records patch recursively through their own patch
//! type; ordered sequences are replaced wholesale, never merged
//! element-wise.

use serde::Serialize;

use super::app::{AppState, PlayerState, PlaylistState, UpNextState};
use crate::model::{PlaybackModes, QueueState, RepeatMode, Song};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    pub playlist: Option<PlaylistPatch>,
    pub upnext: Option<UpNextPatch>,
    pub user_paused: Option<bool>,
    pub player: Option<PlayerPatch>,
    pub ui: Option<UiPatch>,
}

impl StatePatch {
    pub fn playlist(playlist: impl Into<PlaylistPatch>) -> Self {
        Self {
            playlist: Some(playlist.into()),
            ..Self::default()
        }
    }

    pub fn upnext(upnext: impl Into<UpNextPatch>) -> Self {
        Self {
            upnext: Some(upnext.into()),
            ..Self::default()
        }
    }

    pub fn player(player: impl Into<PlayerPatch>) -> Self {
        Self {
            player: Some(player.into()),
            ..Self::default()
        }
    }

    pub fn ui(ui: UiPatch) -> Self {
        Self {
            ui: Some(ui),
            ..Self::default()
        }
    }

    pub fn user_paused(value: bool) -> Self {
        Self {
            user_paused: Some(value),
            ..Self::default()
        }
    }

    pub fn with_user_paused(mut self, value: bool) -> Self {
        self.user_paused = Some(value);
        self
    }

    pub(crate) fn apply_to(&self, state: &mut AppState) {
        if let Some(playlist) = &self.playlist {
            playlist.apply_to(&mut state.playlist);
        }
        if let Some(upnext) = &self.upnext {
            upnext.apply_to(&mut state.upnext);
        }
        if let Some(user_paused) = self.user_paused {
            state.user_paused = user_paused;
        }
        if let Some(player) = &self.player {
            player.apply_to(&mut state.player);
        }
        if let Some(ui) = &self.ui {
            ui.apply_to(&mut state.ui);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaylistPatch {
    pub name: Option<String>,
    pub size: Option<usize>,
    pub current_index: Option<i64>,
    pub items: Option<Vec<Song>>,
    pub queue: Option<QueuePatch>,
    pub modes: Option<ModesPatch>,
}

impl PlaylistPatch {
    pub fn modes(modes: impl Into<ModesPatch>) -> Self {
        Self {
            modes: Some(modes.into()),
            ..Self::default()
        }
    }

    fn apply_to(&self, state: &mut PlaylistState) {
        if let Some(name) = &self.name {
            state.name = name.clone();
        }
        if let Some(size) = self.size {
            state.size = size;
        }
        if let Some(current_index) = self.current_index {
            state.current_index = current_index;
        }
        if let Some(items) = &self.items {
            state.items = items.clone();
        }
        if let Some(queue) = &self.queue {
            queue.apply_to(&mut state.queue);
        }
        if let Some(modes) = &self.modes {
            modes.apply_to(&mut state.modes);
        }
    }
}

impl From<PlaylistState> for PlaylistPatch {
    fn from(state: PlaylistState) -> Self {
        Self {
            name: Some(state.name),
            size: Some(state.size),
            current_index: Some(state.current_index),
            items: Some(state.items),
            queue: Some(state.queue.into()),
            modes: Some(state.modes.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueuePatch {
    pub size: Option<usize>,
    pub items: Option<Vec<Song>>,
}

impl QueuePatch {
    fn apply_to(&self, state: &mut QueueState) {
        if let Some(size) = self.size {
            state.size = size;
        }
        if let Some(items) = &self.items {
            state.items = items.clone();
        }
    }
}

impl From<QueueState> for QueuePatch {
    fn from(state: QueueState) -> Self {
        Self {
            size: Some(state.size),
            items: Some(state.items),
        }
    }
}

/// Partial mode change; doubles as the body of the set-mode operation, which
/// accepts any subset of the fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModesPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shuffle: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatMode>,
}

impl ModesPatch {
    pub fn shuffle(value: bool) -> Self {
        Self {
            shuffle: Some(value),
            ..Self::default()
        }
    }

    pub fn repeat(value: RepeatMode) -> Self {
        Self {
            repeat: Some(value),
            ..Self::default()
        }
    }

    fn apply_to(&self, modes: &mut PlaybackModes) {
        if let Some(shuffle) = self.shuffle {
            modes.shuffle = shuffle;
        }
        if let Some(repeat) = self.repeat {
            modes.repeat = repeat;
        }
    }
}

impl From<PlaybackModes> for ModesPatch {
    fn from(modes: PlaybackModes) -> Self {
        Self {
            shuffle: Some(modes.shuffle),
            repeat: Some(modes.repeat),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpNextPatch {
    /// Outer `None` preserves the field; `Some(None)` clears the current
    /// song.
    pub current: Option<Option<Song>>,
    pub items: Option<Vec<Song>>,
    pub queue_count: Option<usize>,
    pub modes: Option<ModesPatch>,
}

impl UpNextPatch {
    fn apply_to(&self, state: &mut UpNextState) {
        if let Some(current) = &self.current {
            state.current = current.clone();
        }
        if let Some(items) = &self.items {
            state.items = items.clone();
        }
        if let Some(queue_count) = self.queue_count {
            state.queue_count = queue_count;
        }
        if let Some(modes) = &self.modes {
            modes.apply_to(&mut state.modes);
        }
    }
}

impl From<UpNextState> for UpNextPatch {
    fn from(state: UpNextState) -> Self {
        Self {
            current: Some(state.current),
            items: Some(state.items),
            queue_count: Some(state.queue_count),
            modes: Some(state.modes.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerPatch {
    pub is_playing: Option<bool>,
    pub current_time: Option<f64>,
    pub duration: Option<f64>,
    pub volume: Option<f32>,
    pub muted: Option<bool>,
}

impl PlayerPatch {
    /// Transport progress tick; applied silently by transports.
    pub fn progress(current_time: f64, duration: f64, is_playing: bool) -> Self {
        Self {
            is_playing: Some(is_playing),
            current_time: Some(current_time),
            duration: Some(duration),
            ..Self::default()
        }
    }

    fn apply_to(&self, state: &mut PlayerState) {
        if let Some(is_playing) = self.is_playing {
            state.is_playing = is_playing;
        }
        if let Some(current_time) = self.current_time {
            state.current_time = current_time;
        }
        if let Some(duration) = self.duration {
            state.duration = duration;
        }
        if let Some(volume) = self.volume {
            state.volume = volume;
        }
        if let Some(muted) = self.muted {
            state.muted = muted;
        }
    }
}

impl From<PlayerState> for PlayerPatch {
    fn from(state: PlayerState) -> Self {
        Self {
            is_playing: Some(state.is_playing),
            current_time: Some(state.current_time),
            duration: Some(state.duration),
            volume: Some(state.volume),
            muted: Some(state.muted),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiPatch {
    pub loading: Option<bool>,
    /// Outer `None` preserves the field; `Some(None)` clears the error.
    pub error: Option<Option<String>>,
}

impl UiPatch {
    pub fn loading(value: bool) -> Self {
        Self {
            loading: Some(value),
            ..Self::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(Some(message.into())),
            ..Self::default()
        }
    }

    pub fn clear_error() -> Self {
        Self {
            error: Some(None),
            ..Self::default()
        }
    }

    fn apply_to(&self, state: &mut super::app::UiState) {
        if let Some(loading) = self.loading {
            state.loading = loading;
        }
        if let Some(error) = &self.error {
            state.error = error.clone();
        }
    }
}
