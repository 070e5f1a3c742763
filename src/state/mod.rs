mod app;
mod patch;
mod store;

pub use app::{AppState, PlayerState, PlaylistState, UiState, UpNextState};
pub use patch::{
    ModesPatch, PlayerPatch, PlaylistPatch, QueuePatch, StatePatch, UiPatch,
    UpNextPatch,
};
pub use store::{PlaybackSnapshot, Store};
