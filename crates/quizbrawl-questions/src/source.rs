//! The question-source abstraction.
//!
//! Lobby creation is generic over where questions come from. Production
//! uses [`HttpQuestionSource`](crate::HttpQuestionSource); tests plug in
//! a stub that returns a canned set (or always fails, to exercise the
//! fallback path).

use serde::Serialize;

use quizbrawl_game::{QuestionRules, QuestionSet};

use crate::QuestionSourceError;

/// What to ask the question service for.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionRequest {
    pub category: String,
    pub count: usize,
    pub provider: String,
}

impl From<&QuestionRules> for QuestionRequest {
    fn from(rules: &QuestionRules) -> Self {
        Self {
            category: rules.category.clone(),
            count: rules.count,
            provider: rules.provider.clone(),
        }
    }
}

/// Produces a question set for a new lobby.
///
/// `Send + Sync + 'static` because sources are shared by the lobby
/// manager and called from per-connection tasks. The `impl Future + Send`
/// return keeps the future spawnable.
pub trait QuestionSource: Send + Sync + 'static {
    /// Fetches a fresh question set.
    ///
    /// # Errors
    /// Returns [`QuestionSourceError`] when the source is unreachable,
    /// answers with an error status, or sends an empty list. Callers are
    /// expected to fall back rather than propagate.
    fn generate(
        &self,
        request: QuestionRequest,
    ) -> impl std::future::Future<Output = Result<QuestionSet, QuestionSourceError>> + Send;
}
