use std::sync::RwLock;

use crate::event::{
    bus::{EventBus, Subscription},
    events::{EventKind, Notification, StateChange},
};
use crate::model::Song;

use super::app::{AppState, PlayerState, PlaylistState, UpNextState};
use super::patch::{PlayerPatch, StatePatch, UiPatch};

/// Playback intent captured before a mutating remote operation, consumed by
/// the playback-preservation coordinator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSnapshot {
    pub is_playing: bool,
    pub current_time: f64,
    pub user_paused: bool,
}

/// Single source of truth for the client.
///
/// The store is the only writer of [`AppState`]; everything else reads
/// snapshots and reacts to notifications. Updates are typed patches merged
/// field-by-field, and every non-silent update produces one generic
/// state-changed round followed by targeted events for the sub-trees the
/// patch touched.
pub struct Store {
    state: RwLock<AppState>,
    bus: EventBus,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(AppState::default()),
            bus: EventBus::new(),
        }
    }

    /// Merges `patch` into the current state. Unless `silent`, emits the
    /// generic state-changed notification and then playlist / up-next /
    /// player events for each sub-tree present in the patch.
    ///
    /// `silent` exists for high-frequency updates (transport progress
    /// ticks) that must be readable but must not fan out a re-render per
    /// tick.
    pub fn set_state(&self, patch: StatePatch, silent: bool) {
        let (previous, current) = {
            let mut state = self.state.write().unwrap();
            let previous = state.clone();
            patch.apply_to(&mut state);
            (previous, state.clone())
        };

        if silent {
            return;
        }

        // Emitted outside the lock so listeners can read the store.
        self.bus.emit(
            EventKind::StateChanged,
            &Notification::State(StateChange {
                previous,
                current: current.clone(),
                changes: patch.clone(),
            }),
        );
        if patch.playlist.is_some() {
            self.bus.emit(
                EventKind::PlaylistChanged,
                &Notification::Playlist(current.playlist.clone()),
            );
        }
        if patch.upnext.is_some() {
            self.bus.emit(
                EventKind::UpNextChanged,
                &Notification::UpNext(current.upnext.clone()),
            );
        }
        if patch.player.is_some() {
            self.bus.emit(
                EventKind::PlayerChanged,
                &Notification::Player(current.player),
            );
        }
    }

    /// Snapshot of the whole state. Callers must treat it as read-only;
    /// mutations go through [`Store::set_state`].
    pub fn get_state(&self) -> AppState {
        self.state.read().unwrap().clone()
    }

    pub fn playlist(&self) -> PlaylistState {
        self.state.read().unwrap().playlist.clone()
    }

    pub fn upnext(&self) -> UpNextState {
        self.state.read().unwrap().upnext.clone()
    }

    pub fn player(&self) -> PlayerState {
        self.state.read().unwrap().player.clone()
    }

    pub fn user_paused(&self) -> bool {
        self.state.read().unwrap().user_paused
    }

    pub fn current_song(&self) -> Option<Song> {
        self.state.read().unwrap().current_song().cloned()
    }

    pub fn set_loading(&self, loading: bool) {
        self.set_state(StatePatch::ui(UiPatch::loading(loading)), false);
    }

    pub fn set_error(&self, message: impl Into<String>) {
        self.set_state(StatePatch::ui(UiPatch::error(message)), false);
    }

    pub fn clear_error(&self) {
        self.set_state(StatePatch::ui(UiPatch::clear_error()), false);
    }

    pub fn preserve_playback_state(&self) -> PlaybackSnapshot {
        let state = self.state.read().unwrap();
        PlaybackSnapshot {
            is_playing: state.player.is_playing,
            current_time: state.player.current_time,
            user_paused: state.user_paused,
        }
    }

    pub fn restore_playback_state(&self, snapshot: &PlaybackSnapshot) {
        self.set_state(
            StatePatch {
                player: Some(PlayerPatch {
                    is_playing: Some(snapshot.is_playing),
                    current_time: Some(snapshot.current_time),
                    ..PlayerPatch::default()
                }),
                user_paused: Some(snapshot.user_paused),
                ..StatePatch::default()
            },
            false,
        );
    }

    /// Subscribes to one named event.
    pub fn subscribe(
        &self,
        kind: EventKind,
        callback: impl Fn(&Notification) + Send + Sync + 'static,
    ) -> Subscription {
        self.bus.on(kind, callback)
    }

    /// Subscribes to every non-silent change.
    pub fn subscribe_all(
        &self,
        callback: impl Fn(&StateChange) + Send + Sync + 'static,
    ) -> Subscription {
        self.bus.on(EventKind::StateChanged, move |notification| {
            if let Notification::State(change) = notification {
                callback(change);
            }
        })
    }

    /// Subscribes with a predicate evaluated on every non-silent change;
    /// the callback fires only when the predicate holds.
    pub fn subscribe_filtered(
        &self,
        filter: impl Fn(&AppState, &AppState) -> bool + Send + Sync + 'static,
        callback: impl Fn(&AppState, &AppState) + Send + Sync + 'static,
    ) -> Subscription {
        self.bus.on(EventKind::StateChanged, move |notification| {
            if let Notification::State(change) = notification
                && filter(&change.current, &change.previous)
            {
                callback(&change.current, &change.previous);
            }
        })
    }

    /// Channel-style subscription for consumers that drain notifications
    /// from their own task. Dropping the receiver without unsubscribing
    /// leaves the registration in place.
    pub fn watch(&self, kind: EventKind) -> (flume::Receiver<Notification>, Subscription) {
        let (tx, rx) = flume::unbounded();
        let subscription = self.bus.on(kind, move |notification| {
            let _ = tx.send(notification.clone());
        });
        (rx, subscription)
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }
}
