//! HTTP client for the external question service.

use serde::Deserialize;

use quizbrawl_game::{Question, QuestionSet};
use quizbrawl_protocol::{Answer, AnswerId, QuestionId};

use crate::{QuestionRequest, QuestionSource, QuestionSourceError};

/// One question as the service sends it: the client-facing fields plus
/// the correct answer's id, which stays server-side from here on.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceQuestion {
    pub id: QuestionId,
    pub text: String,
    pub answers: Vec<Answer>,
    pub correct_answer: AnswerId,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    questions: Vec<ServiceQuestion>,
}

/// Question source backed by the question service's
/// `POST /questions/generate` endpoint.
#[derive(Debug, Clone)]
pub struct HttpQuestionSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpQuestionSource {
    /// # Errors
    /// Returns `QuestionSourceError::Http` if the client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, QuestionSourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl QuestionSource for HttpQuestionSource {
    async fn generate(
        &self,
        request: QuestionRequest,
    ) -> Result<QuestionSet, QuestionSourceError> {
        let url = format!("{}/questions/generate", self.base_url);
        tracing::info!(
            %url,
            category = %request.category,
            count = request.count,
            provider = %request.provider,
            "requesting questions from question service"
        );

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QuestionSourceError::Status { status, body });
        }

        let payload: GenerateResponse = response.json().await?;
        if payload.questions.is_empty() {
            return Err(QuestionSourceError::Empty);
        }
        tracing::info!(count = payload.questions.len(), "received questions");
        Ok(into_question_set(payload.questions))
    }
}

/// Splits service questions into the client-facing list and the private
/// answer key.
fn into_question_set(questions: Vec<ServiceQuestion>) -> QuestionSet {
    let mut set = QuestionSet::default();
    for sq in questions {
        set.answer_key.insert(sq.id, sq.correct_answer);
        set.questions
            .push(Question::new(sq.id, sq.text, sq.answers));
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_question_decodes_camel_case() {
        let raw = r#"{
            "id": "6ba7b810-9dad-11d1-80b4-00c04fd430c8",
            "text": "What is 2 + 2?",
            "providedAnswers": {},
            "answers": [
                { "id": "6ba7b811-9dad-11d1-80b4-00c04fd430c8", "text": "4" },
                { "id": "6ba7b812-9dad-11d1-80b4-00c04fd430c8", "text": "5" }
            ],
            "correctAnswer": "6ba7b811-9dad-11d1-80b4-00c04fd430c8"
        }"#;
        let sq: ServiceQuestion = serde_json::from_str(raw).unwrap();
        assert_eq!(sq.text, "What is 2 + 2?");
        assert_eq!(sq.correct_answer, sq.answers[0].id);
        assert_eq!(sq.answers.len(), 2);
    }

    #[test]
    fn test_conversion_builds_answer_key() {
        let correct = Answer {
            id: AnswerId::random(),
            text: "4".into(),
        };
        let sq = ServiceQuestion {
            id: QuestionId::random(),
            text: "What is 2 + 2?".into(),
            answers: vec![
                correct.clone(),
                Answer {
                    id: AnswerId::random(),
                    text: "5".into(),
                },
            ],
            correct_answer: correct.id,
        };
        let qid = sq.id;

        let set = into_question_set(vec![sq]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.answer_key[&qid], correct.id);
        // The question itself carries no answer key.
        assert_eq!(set.questions[0].answers.len(), 2);
    }
}
