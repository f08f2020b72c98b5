//! Wire protocol for Quizbrawl.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`Player`], [`QuestionView`], identity newtypes): the
//!   structures that travel on the wire.
//! - **Messages** ([`IncomingMessage`], [`OutgoingMessage`]): the JSON
//!   envelopes, internally tagged on a `type` field with camelCase keys.
//! - **Parsing** ([`parse_incoming`]): untrusted-payload validation that
//!   distinguishes recoverable schema errors from fatal unknown types.
//!
//! The protocol layer knows nothing about lobbies or connections; it only
//! knows how messages look and how to validate them.

mod error;
mod messages;
mod parse;
mod types;

pub use error::ProtocolError;
pub use messages::{
    ActionKind, AttackConfig, GameConfigPayload, IncomingMessage,
    OutgoingMessage, PlayerConfig, PowerUpsConfig, ShieldConfig, SkipConfig,
};
pub use parse::{encode_outgoing, parse_incoming};
pub use types::{Answer, AnswerId, Player, PlayerId, QuestionId, QuestionView};
