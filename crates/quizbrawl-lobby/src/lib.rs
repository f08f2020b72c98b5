//! Lobby lifecycle management for Quizbrawl.
//!
//! Each lobby runs as an isolated Tokio task (actor model) owning one
//! [`Game`](quizbrawl_game::Game). Connections talk to a lobby through a
//! cloneable [`LobbyHandle`]; the [`LobbyManager`] creates lobbies on
//! first join (fetching questions, with a local fallback) and deletes
//! them when the last player leaves.
//!
//! # Key types
//!
//! - [`LobbyManager`]: creates/destroys lobbies, routes joins
//! - [`LobbyHandle`]: send commands to a running lobby actor
//! - [`Dispatcher`]: fans game events out to player channels
//! - [`PlayerSender`]: per-player outbound message channel

mod actor;
mod dispatch;
mod error;
mod manager;

pub use actor::LobbyHandle;
pub use dispatch::{Dispatcher, PlayerSender};
pub use error::LobbyError;
pub use manager::LobbyManager;
