use async_trait::async_trait;

/// Control surface of the externally owned audio transport.
///
/// Implementations own their failure reporting: a resume that fails
/// (autoplay restriction, missing source) is surfaced as a media error on
/// the store by the transport itself, never returned to the coordinator.
/// Implementations are also expected to feed progress ticks back into the
/// store with silent player patches.
#[async_trait]
pub trait PlaybackTransport: Send + Sync {
    async fn resume(&self);
    async fn pause(&self);
    /// Seek to an absolute position in seconds.
    async fn seek(&self, position: f64);
}

/// Transport for headless use; every control is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedTransport;

#[async_trait]
impl PlaybackTransport for DetachedTransport {
    async fn resume(&self) {}
    async fn pause(&self) {}
    async fn seek(&self, _position: f64) {}
}
