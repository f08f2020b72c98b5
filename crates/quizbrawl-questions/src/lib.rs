//! Question sourcing for Quizbrawl.
//!
//! Lobbies need a [`QuestionSet`](quizbrawl_game::QuestionSet) before the
//! first player can join. This crate provides the [`QuestionSource`] trait
//! plus two implementations: [`HttpQuestionSource`], which asks the
//! external question service over HTTP, and the in-process
//! [`fallback_question_set`] the lobby manager falls back to when the
//! service is down. A failed fetch is never fatal to lobby creation.

mod error;
mod fallback;
mod http;
mod source;

pub use error::QuestionSourceError;
pub use fallback::fallback_question_set;
pub use http::{HttpQuestionSource, ServiceQuestion};
pub use source::{QuestionRequest, QuestionSource};
