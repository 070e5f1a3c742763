//! Data types shared by the store and the gateway. Field names follow the
//! wire format of the backend (camelCase where the routes use it).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Server-issued id, unique within a playlist.
    pub id: String,
    pub title: String,
    pub artist: String,
    pub url: String,
    #[serde(default)]
    pub favorite: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    Off,
    All,
    One,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackModes {
    pub shuffle: bool,
    pub repeat: RepeatMode,
}

/// Manual queue as the backend reports it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueueState {
    pub size: usize,
    pub items: Vec<Song>,
}

/// Response of the playlist collection routes: every playlist name plus the
/// active one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistIndex {
    pub active: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoritesList {
    /// Name of the playlist the favorites were collected from.
    pub playlist: String,
    pub items: Vec<Song>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub url: String,
    pub filename: String,
}

/// Body of the add-song operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<SongPosition>,
    /// Insertion index, read by the server only for [`SongPosition::Index`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Target playlist; the active one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SongPosition {
    Start,
    End,
    Index,
}
