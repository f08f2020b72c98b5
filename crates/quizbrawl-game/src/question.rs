//! Domain question types.
//!
//! A [`Question`] carries per-round submission bookkeeping that must never
//! leave the server; [`QuestionView`](quizbrawl_protocol::QuestionView) is
//! the projection clients see. The correct answers live in a separate
//! answer key on the [`QuestionSet`], not on the question itself.

use std::collections::HashMap;

use quizbrawl_protocol::{Answer, AnswerId, PlayerId, QuestionId, QuestionView};

/// One question in a session, including who has answered it.
///
/// `submissions` maps a player to what they submitted. `None` is the skip
/// sentinel: the player counts as having answered (so the round can
/// resolve) but earns nothing.
#[derive(Debug, Clone)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub answers: Vec<Answer>,
    pub submissions: HashMap<PlayerId, Option<AnswerId>>,
}

impl Question {
    /// Creates a question with no submissions yet.
    pub fn new(id: QuestionId, text: impl Into<String>, answers: Vec<Answer>) -> Self {
        Self {
            id,
            text: text.into(),
            answers,
            submissions: HashMap::new(),
        }
    }

    /// The client-facing projection: no submissions, no answer key.
    pub fn view(&self) -> QuestionView {
        QuestionView {
            id: self.id,
            text: self.text.clone(),
            answers: self.answers.clone(),
        }
    }
}

/// An ordered question list plus the private answer key.
#[derive(Debug, Clone, Default)]
pub struct QuestionSet {
    pub questions: Vec<Question>,
    pub answer_key: HashMap<QuestionId, AnswerId>,
}

impl QuestionSet {
    /// Number of questions in the set.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the set holds no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
