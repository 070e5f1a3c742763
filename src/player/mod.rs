pub mod coordinator;
pub mod transport;

pub use coordinator::PlaybackCoordinator;
pub use transport::{DetachedTransport, PlaybackTransport};
