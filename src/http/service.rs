use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::{
    event::events::{EventKind, Notification},
    model::{FavoritesList, NewSong, PlaybackModes, PlaylistIndex, QueueState, UploadedFile},
    player::{coordinator::PlaybackCoordinator, transport::PlaybackTransport},
    state::{ModesPatch, PlaylistPatch, PlaylistState, StatePatch, Store, UpNextState},
};

use super::gateway::{ApiRequest, GatewayError, RemoteGateway};

/// Client-side entry point for every remote operation.
///
/// Each operation fetches or mutates server state, writes the returned
/// authoritative sub-trees into the store, and re-raises failures after
/// recording them on `ui.error`. Mutations that can reset the transport
/// source run inside the playback-preservation coordinator. Back-to-back
/// operations are deliberately not fenced against each other: responses
/// land in completion order, which need not match issue order.
pub struct ApiService {
    gateway: Arc<dyn RemoteGateway>,
    store: Arc<Store>,
    transport: Arc<dyn PlaybackTransport>,
    coordinator: PlaybackCoordinator,
}

impl ApiService {
    pub fn new(
        gateway: Arc<dyn RemoteGateway>,
        store: Arc<Store>,
        transport: Arc<dyn PlaybackTransport>,
    ) -> Self {
        let coordinator = PlaybackCoordinator::new(store.clone(), transport.clone());
        Self {
            gateway,
            store,
            transport,
            coordinator,
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn coordinator(&self) -> &PlaybackCoordinator {
        &self.coordinator
    }

    /// One request with the shared bookkeeping: loading on before the
    /// exchange, loading off before any error is recorded, the failure
    /// message surfaced verbatim into `ui.error` and re-raised.
    async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, GatewayError> {
        self.store.set_loading(true);
        self.store.clear_error();
        let path = request.path.clone();

        match self.gateway.send(request).await {
            Ok(value) => {
                self.store.set_loading(false);
                serde_json::from_value(value).map_err(|e| {
                    let error = GatewayError::InvalidResponse(e.to_string());
                    self.store.set_error(error.to_string());
                    error
                })
            }
            Err(error) => {
                self.store.set_loading(false);
                self.store.set_error(error.to_string());
                tracing::info!("request to {} failed: {}", path, error);
                Err(error)
            }
        }
    }

    fn body(value: &impl serde::Serialize) -> Result<serde_json::Value, GatewayError> {
        serde_json::to_value(value)
            .map_err(|e| GatewayError::InvalidResponse(format!("request body: {e}")))
    }

    // ----- playlists -----

    pub async fn fetch_playlist(&self) -> Result<PlaylistState, GatewayError> {
        let playlist: PlaylistState = self.call(ApiRequest::get("/api/playlist")).await?;
        self.store
            .set_state(StatePatch::playlist(playlist.clone()), false);
        Ok(playlist)
    }

    pub async fn list_playlists(&self) -> Result<PlaylistIndex, GatewayError> {
        self.call(ApiRequest::get("/api/playlists")).await
    }

    pub async fn create_playlist(&self, name: &str) -> Result<PlaylistIndex, GatewayError> {
        self.call(ApiRequest::post("/api/playlists", json!({ "name": name })))
            .await
    }

    /// Switches the active playlist, then reloads playlist and up-next.
    pub async fn activate_playlist(&self, name: &str) -> Result<PlaylistIndex, GatewayError> {
        self.coordinator
            .preserve_playback_during(async {
                let index: PlaylistIndex = self
                    .call(ApiRequest::post(
                        "/api/playlists/activate",
                        json!({ "name": name }),
                    ))
                    .await?;
                self.fetch_playlist().await?;
                self.fetch_up_next().await?;
                Ok(index)
            })
            .await
    }

    pub async fn delete_playlist(&self, name: &str) -> Result<PlaylistIndex, GatewayError> {
        self.coordinator
            .preserve_playback_during(async {
                let index: PlaylistIndex = self
                    .call(ApiRequest::delete(format!("/api/playlists/{name}")))
                    .await?;
                self.fetch_playlist().await?;
                Ok(index)
            })
            .await
    }

    // ----- songs -----

    pub async fn add_song(&self, song: &NewSong) -> Result<PlaylistState, GatewayError> {
        self.coordinator
            .preserve_playback_during(async {
                let playlist: PlaylistState = self
                    .call(ApiRequest::post("/api/songs", Self::body(song)?))
                    .await?;
                self.store
                    .set_state(StatePatch::playlist(playlist.clone()), false);
                self.fetch_up_next().await?;
                Ok(playlist)
            })
            .await
    }

    pub async fn remove_song(&self, id: &str) -> Result<PlaylistState, GatewayError> {
        self.coordinator
            .preserve_playback_during(async {
                let playlist: PlaylistState = self
                    .call(ApiRequest::delete(format!("/api/songs/{id}")))
                    .await?;
                self.store
                    .set_state(StatePatch::playlist(playlist.clone()), false);
                self.fetch_up_next().await?;
                Ok(playlist)
            })
            .await
    }

    pub async fn toggle_favorite(&self, id: &str) -> Result<PlaylistState, GatewayError> {
        self.coordinator
            .preserve_playback_during(async {
                let playlist: PlaylistState = self
                    .call(ApiRequest::patch(format!("/api/songs/{id}/favorite")))
                    .await?;
                self.store
                    .set_state(StatePatch::playlist(playlist.clone()), false);
                Ok(playlist)
            })
            .await
    }

    pub async fn favorites(&self) -> Result<FavoritesList, GatewayError> {
        self.call(ApiRequest::get("/api/favorites")).await
    }

    // ----- transport cursor -----

    pub async fn set_current(&self, index: usize) -> Result<PlaylistState, GatewayError> {
        self.select(ApiRequest::post(
            "/api/control/current",
            json!({ "index": index }),
        ))
        .await
    }

    pub async fn next(&self) -> Result<PlaylistState, GatewayError> {
        self.select(ApiRequest::post_empty("/api/control/next")).await
    }

    pub async fn prev(&self) -> Result<PlaylistState, GatewayError> {
        self.select(ApiRequest::post_empty("/api/control/prev")).await
    }

    pub async fn jump_to(&self, song_id: &str) -> Result<PlaylistState, GatewayError> {
        self.select(ApiRequest::post(
            "/api/control/jump",
            json!({ "songId": song_id }),
        ))
        .await
    }

    /// Shared tail of the selection operations: selecting a song always
    /// clears manual pause intent, reloads the lookahead, and autoplays
    /// once the new source settles.
    async fn select(&self, request: ApiRequest) -> Result<PlaylistState, GatewayError> {
        let playlist: PlaylistState = self.call(request).await?;
        self.store.set_state(
            StatePatch::playlist(playlist.clone()).with_user_paused(false),
            false,
        );
        self.fetch_up_next().await?;
        self.coordinator.request_autoplay();
        Ok(playlist)
    }

    // ----- queue -----

    pub async fn fetch_up_next(&self) -> Result<UpNextState, GatewayError> {
        let upnext: UpNextState = self.call(ApiRequest::get("/api/upnext")).await?;
        self.store
            .set_state(StatePatch::upnext(upnext.clone()), false);
        Ok(upnext)
    }

    pub async fn fetch_queue(&self) -> Result<QueueState, GatewayError> {
        self.call(ApiRequest::get("/api/queue")).await
    }

    pub async fn enqueue_song(&self, song_id: &str) -> Result<QueueState, GatewayError> {
        self.coordinator
            .preserve_playback_during(async {
                let queue: QueueState = self
                    .call(ApiRequest::post(
                        "/api/queue/enqueue",
                        json!({ "songId": song_id }),
                    ))
                    .await?;
                self.fetch_up_next().await?;
                Ok(queue)
            })
            .await
    }

    pub async fn remove_from_queue(&self, index: usize) -> Result<QueueState, GatewayError> {
        self.coordinator
            .preserve_playback_during(async {
                let queue: QueueState = self
                    .call(ApiRequest::delete(format!("/api/queue/{index}")))
                    .await?;
                self.fetch_up_next().await?;
                self.fetch_playlist().await?;
                Ok(queue)
            })
            .await
    }

    pub async fn clear_queue(&self) -> Result<QueueState, GatewayError> {
        self.coordinator
            .preserve_playback_during(async {
                let queue: QueueState =
                    self.call(ApiRequest::post_empty("/api/queue/clear")).await?;
                self.fetch_up_next().await?;
                Ok(queue)
            })
            .await
    }

    // ----- modes -----

    /// Partial mode change; the returned modes are merged into
    /// `playlist.modes` and the lookahead is reloaded (shuffle and repeat
    /// reorder it server-side).
    pub async fn set_mode(&self, modes: ModesPatch) -> Result<PlaybackModes, GatewayError> {
        self.coordinator
            .preserve_playback_during(async {
                let modes: PlaybackModes = self
                    .call(ApiRequest::post("/api/mode", Self::body(&modes)?))
                    .await?;
                self.store.set_state(
                    StatePatch::playlist(PlaylistPatch::modes(modes)),
                    false,
                );
                self.fetch_up_next().await?;
                Ok(modes)
            })
            .await
    }

    pub async fn get_mode(&self) -> Result<PlaybackModes, GatewayError> {
        self.call(ApiRequest::get("/api/mode")).await
    }

    // ----- upload -----

    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<UploadedFile, GatewayError> {
        self.store.set_loading(true);
        match self.gateway.upload(filename, bytes).await {
            Ok(value) => {
                self.store.set_loading(false);
                serde_json::from_value(value).map_err(|e| {
                    let error = GatewayError::InvalidResponse(e.to_string());
                    self.store.set_error(error.to_string());
                    error
                })
            }
            Err(error) => {
                self.store.set_loading(false);
                self.store.set_error(error.to_string());
                Err(error)
            }
        }
    }

    // ----- lifecycle -----

    /// First hydration: playlist, up-next and modes fetched concurrently,
    /// then the app-initialized event.
    pub async fn initialize(&self) -> Result<(), GatewayError> {
        self.store.set_loading(true);
        let result = futures::try_join!(
            self.fetch_playlist(),
            self.fetch_up_next(),
            self.get_mode()
        );

        match result {
            Ok(_) => {
                self.store.set_loading(false);
                self.store
                    .events()
                    .emit(EventKind::AppInitialized, &Notification::Initialized);
                Ok(())
            }
            Err(error) => {
                self.store.set_loading(false);
                self.store.set_error(error.to_string());
                Err(error)
            }
        }
    }

    // ----- local transport intent -----

    /// Explicit user play; clears manual pause intent.
    pub async fn play(&self) {
        self.store.set_state(StatePatch::user_paused(false), false);
        self.transport.resume().await;
    }

    /// Explicit user pause; system pauses never set this.
    pub async fn pause(&self) {
        self.store.set_state(StatePatch::user_paused(true), false);
        self.transport.pause().await;
    }

    pub async fn toggle_play_pause(&self) {
        if self.store.player().is_playing {
            self.pause().await;
        } else {
            self.play().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        http::gateway::Method,
        player::transport::DetachedTransport,
        state::{PlayerPatch, UiPatch},
    };

    struct FakeGateway {
        responses: Mutex<HashMap<String, Value>>,
        failures: Mutex<HashMap<String, GatewayError>>,
        requests: Mutex<Vec<String>>,
    }

    fn key(method: Method, path: &str) -> String {
        format!("{method:?} {path}")
    }

    impl FakeGateway {
        fn new() -> Self {
            Self {
                responses: Mutex::new(HashMap::new()),
                failures: Mutex::new(HashMap::new()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn respond(self, method: Method, path: &str, value: Value) -> Self {
            self.responses.lock().unwrap().insert(key(method, path), value);
            self
        }

        fn fail(self, method: Method, path: &str, error: GatewayError) -> Self {
            self.failures.lock().unwrap().insert(key(method, path), error);
            self
        }
    }

    #[async_trait]
    impl RemoteGateway for FakeGateway {
        async fn send(&self, request: ApiRequest) -> Result<Value, GatewayError> {
            let key = key(request.method, &request.path);
            self.requests.lock().unwrap().push(key.clone());

            if let Some(error) = self.failures.lock().unwrap().get(&key) {
                return Err(error.clone());
            }
            self.responses
                .lock()
                .unwrap()
                .get(&key)
                .cloned()
                .ok_or_else(|| GatewayError::Http {
                    status: 404,
                    message: format!("no stub for {key}"),
                })
        }

        async fn upload(&self, _filename: &str, _bytes: Vec<u8>) -> Result<Value, GatewayError> {
            let key = "UPLOAD /api/upload".to_owned();
            self.requests.lock().unwrap().push(key.clone());
            self.responses
                .lock()
                .unwrap()
                .get(&key)
                .cloned()
                .ok_or_else(|| GatewayError::Http {
                    status: 400,
                    message: "file field required".to_owned(),
                })
        }
    }

    fn playlist_json() -> Value {
        json!({
            "name": "General",
            "size": 1,
            "currentIndex": 0,
            "items": [{
                "id": "s1",
                "title": "Intro Beat",
                "artist": "Dev One",
                "url": "/media/s1.wav",
                "favorite": false
            }],
            "queue": { "size": 0, "items": [] },
            "modes": { "shuffle": false, "repeat": "off" }
        })
    }

    fn upnext_json() -> Value {
        json!({
            "current": null,
            "items": [],
            "queueCount": 0,
            "modes": { "shuffle": false, "repeat": "off" }
        })
    }

    fn service(gateway: FakeGateway) -> ApiService {
        ApiService::new(
            Arc::new(gateway),
            Arc::new(Store::new()),
            Arc::new(DetachedTransport),
        )
    }

    #[tokio::test]
    async fn add_song_applies_the_authoritative_playlist_once() {
        let gateway = FakeGateway::new()
            .respond(Method::Post, "/api/songs", playlist_json())
            .respond(Method::Get, "/api/upnext", upnext_json());
        let service = service(gateway);

        let playlist_events = Arc::new(AtomicUsize::new(0));
        let seen = playlist_events.clone();
        let _sub = service.store().subscribe(EventKind::PlaylistChanged, move |n| {
            if let Notification::Playlist(playlist) = n {
                assert_eq!(playlist.items.len(), 1);
                assert_eq!(playlist.current_index, 0);
            }
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let song = NewSong {
            title: "Intro Beat".to_owned(),
            artist: "Dev One".to_owned(),
            url: "/media/s1.wav".to_owned(),
            ..NewSong::default()
        };
        let playlist = service.add_song(&song).await.unwrap();

        assert_eq!(playlist.items.len(), 1);
        assert_eq!(playlist_events.load(Ordering::SeqCst), 1);
        let state = service.store().get_state();
        assert_eq!(state.playlist.items.len(), 1);
        assert_eq!(state.playlist.current_index, 0);
        assert!(!state.ui.loading);
    }

    #[tokio::test]
    async fn failures_surface_verbatim_and_propagate() {
        let gateway = FakeGateway::new().fail(
            Method::Post,
            "/api/playlists",
            GatewayError::Http {
                status: 400,
                message: "playlist already exists".to_owned(),
            },
        );
        let service = service(gateway);

        let result = service.create_playlist("General").await;
        assert!(matches!(result, Err(GatewayError::Http { status: 400, .. })));

        let state = service.store().get_state();
        assert_eq!(state.ui.error.as_deref(), Some("playlist already exists"));
        assert!(!state.ui.loading);
    }

    #[tokio::test]
    async fn selecting_a_song_clears_manual_pause_intent() {
        let gateway = FakeGateway::new()
            .respond(Method::Post, "/api/control/current", playlist_json())
            .respond(Method::Get, "/api/upnext", upnext_json());
        let service = service(gateway);
        service
            .store()
            .set_state(StatePatch::user_paused(true), false);

        service.set_current(0).await.unwrap();

        assert!(!service.store().user_paused());
        assert_eq!(service.store().playlist().current_index, 0);
    }

    #[tokio::test]
    async fn set_mode_merges_into_playlist_modes() {
        let gateway = FakeGateway::new()
            .respond(Method::Post, "/api/songs", playlist_json())
            .respond(
                Method::Post,
                "/api/mode",
                json!({ "shuffle": true, "repeat": "off" }),
            )
            .respond(Method::Get, "/api/upnext", upnext_json());
        let service = service(gateway);
        service
            .add_song(&NewSong {
                title: "t".to_owned(),
                artist: "a".to_owned(),
                url: "u".to_owned(),
                ..NewSong::default()
            })
            .await
            .unwrap();

        let modes = service.set_mode(ModesPatch::shuffle(true)).await.unwrap();

        assert!(modes.shuffle);
        let playlist = service.store().playlist();
        assert!(playlist.modes.shuffle);
        // The mode change must not clobber its playlist siblings.
        assert_eq!(playlist.items.len(), 1);
        assert_eq!(playlist.name, "General");
    }

    #[tokio::test]
    async fn initialize_hydrates_and_announces() {
        let gateway = FakeGateway::new()
            .respond(Method::Get, "/api/playlist", playlist_json())
            .respond(Method::Get, "/api/upnext", upnext_json())
            .respond(
                Method::Get,
                "/api/mode",
                json!({ "shuffle": false, "repeat": "off" }),
            );
        let service = service(gateway);
        let (rx, _sub) = service.store().watch(EventKind::AppInitialized);

        service.initialize().await.unwrap();

        assert!(matches!(rx.try_recv(), Ok(Notification::Initialized)));
        let state = service.store().get_state();
        assert_eq!(state.playlist.name, "General");
        assert!(!state.ui.loading);
        assert!(state.ui.error.is_none());
    }

    #[tokio::test]
    async fn mutations_preserve_active_playback() {
        #[derive(Default)]
        struct RecordingTransport {
            resumes: AtomicUsize,
            seeks: Mutex<Vec<f64>>,
        }

        #[async_trait]
        impl PlaybackTransport for RecordingTransport {
            async fn resume(&self) {
                self.resumes.fetch_add(1, Ordering::SeqCst);
            }
            async fn pause(&self) {}
            async fn seek(&self, position: f64) {
                self.seeks.lock().unwrap().push(position);
            }
        }

        let gateway = FakeGateway::new()
            .respond(Method::Delete, "/api/songs/s1", playlist_json())
            .respond(Method::Get, "/api/upnext", upnext_json());
        let transport = Arc::new(RecordingTransport::default());
        let service = ApiService::new(
            Arc::new(gateway),
            Arc::new(Store::new()),
            transport.clone(),
        );
        service.store().set_state(
            StatePatch::player(PlayerPatch::progress(33.0, 120.0, true)),
            true,
        );

        service.remove_song("s1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(*transport.seeks.lock().unwrap(), vec![33.0]);
        assert_eq!(transport.resumes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn upload_resolves_to_the_served_url() {
        let gateway = FakeGateway::new();
        gateway.responses.lock().unwrap().insert(
            "UPLOAD /api/upload".to_owned(),
            json!({ "url": "/media/abc.mp3", "filename": "abc.mp3" }),
        );
        let service = service(gateway);

        let uploaded = service.upload("track.mp3", vec![1, 2, 3]).await.unwrap();
        assert_eq!(uploaded.url, "/media/abc.mp3");
        assert!(!service.store().get_state().ui.loading);
    }

    #[tokio::test]
    async fn failure_resets_loading_before_recording_the_error() {
        let gateway = FakeGateway::new();
        let service = service(gateway);
        service
            .store()
            .set_state(StatePatch::ui(UiPatch::error("older failure")), false);

        let result = service.fetch_queue().await;
        assert!(result.is_err());
        let state = service.store().get_state();
        assert!(!state.ui.loading);
        assert_eq!(
            state.ui.error.as_deref(),
            Some("no stub for Get /api/queue")
        );
    }
}
