//! Client core of the Tunedeck music player.
//!
//! The crate holds the state store, the notification bus, the
//! playback-preservation coordinator, and the remote operation gateway.
//! Rendering stays outside: UI panels subscribe to store notifications
//! (callbacks or channels) and drive the operations on
//! [`http::ApiService`].

pub mod event;
pub mod http;
pub mod model;
pub mod player;
pub mod state;
pub mod util;
