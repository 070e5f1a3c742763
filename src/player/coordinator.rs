use std::{
    future::Future,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::task::JoinHandle;

use crate::state::{PlaybackSnapshot, Store};

use super::transport::PlaybackTransport;

/// Delay before touching the transport after a refresh, long enough for a
/// source reassignment triggered by the new state to settle.
const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Keeps server-driven refreshes inaudible.
///
/// Every mutating remote operation re-fetches playlist or queue state,
/// which can make the UI reset the transport source. Wrapping the
/// operation here preserves position and resume intent across the round
/// trip. The user's most recent explicit intent always wins: `user_paused`
/// is re-checked right before resuming, and a pause that lands during the
/// settling delay cancels the resume.
pub struct PlaybackCoordinator {
    store: Arc<Store>,
    transport: Arc<dyn PlaybackTransport>,
    settle_delay: Duration,
    /// At most one deferred resume is pending; a newer attempt aborts the
    /// older one.
    pending_resume: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackCoordinator {
    pub fn new(store: Arc<Store>, transport: Arc<dyn PlaybackTransport>) -> Self {
        Self {
            store,
            transport,
            settle_delay: SETTLE_DELAY,
            pending_resume: Mutex::new(None),
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Snapshots playback intent, awaits `operation`, and — when the
    /// transport was actively playing and not user-paused — schedules a
    /// deferred seek-and-resume. A failing operation propagates unchanged
    /// and schedules nothing.
    pub async fn preserve_playback_during<T, E>(
        &self,
        operation: impl Future<Output = Result<T, E>>,
    ) -> Result<T, E> {
        let snapshot = self.store.preserve_playback_state();
        let result = operation.await?;

        if snapshot.is_playing && !snapshot.user_paused {
            self.schedule_resume(Some(snapshot));
        }
        Ok(result)
    }

    /// Resume shortly after a song selection or skip; manual pause intent
    /// was just cleared by the operation.
    pub fn request_autoplay(&self) {
        self.schedule_resume(None);
    }

    /// The transport paused without a user pause action (source swap,
    /// focus loss). Treat it as transient and resume, unless the user
    /// pauses first.
    pub fn on_transport_pause(&self) {
        if self.store.user_paused() {
            return;
        }
        self.schedule_resume(None);
    }

    fn schedule_resume(&self, snapshot: Option<PlaybackSnapshot>) {
        let store = self.store.clone();
        let transport = self.transport.clone();
        let delay = self.settle_delay;

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // Re-check at the last moment: the user may have paused while
            // the request was in flight or during the delay.
            if store.user_paused() {
                return;
            }
            if let Some(snapshot) = &snapshot {
                transport.seek(snapshot.current_time).await;
            }
            transport.resume().await;
            if let Some(snapshot) = &snapshot {
                store.restore_playback_state(snapshot);
            }
        });

        if let Some(previous) = self.pending_resume.lock().unwrap().replace(task) {
            previous.abort();
        }
    }
}
