//! # Quizbrawl
//!
//! Real-time multiplayer trivia battle royale server.
//!
//! Players join a lobby over WebSocket, ready up, and race through a
//! shared question list. Fast correct answers earn power points, which
//! buy attacks, shields, and skips against the other players. Score
//! doubles as health; the game ends when the questions run out.
//!
//! This crate is the outermost layer: it owns the listener, the
//! per-connection handlers, and configuration. The layers underneath:
//!
//! - [`quizbrawl_protocol`]: wire messages and parsing
//! - [`quizbrawl_game`]: the per-lobby state machine
//! - [`quizbrawl_questions`]: question service client and fallback
//! - [`quizbrawl_lobby`]: lobby actors and event dispatch

mod config;
mod connection;
mod error;
mod server;

pub use config::{AppConfig, QuestionServiceConfig};
pub use error::ServerError;
pub use server::QuizbrawlServer;
