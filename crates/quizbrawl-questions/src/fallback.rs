//! Hardcoded questions used when the question service is unavailable.

use rand::seq::SliceRandom;

use quizbrawl_game::{Question, QuestionSet};
use quizbrawl_protocol::{Answer, AnswerId, QuestionId};

/// Builds a question set of `count` copies of a stock question, each with
/// fresh ids and a shuffled answer order so the correct option does not
/// sit in the same slot every round.
pub fn fallback_question_set(count: usize) -> QuestionSet {
    let mut set = QuestionSet::default();
    let mut rng = rand::rng();
    for _ in 0..count {
        let correct = AnswerId::random();
        let mut answers = vec![
            Answer {
                id: correct,
                text: "Paris".into(),
            },
            Answer {
                id: AnswerId::random(),
                text: "London".into(),
            },
            Answer {
                id: AnswerId::random(),
                text: "Berlin".into(),
            },
            Answer {
                id: AnswerId::random(),
                text: "Madrid".into(),
            },
        ];
        answers.shuffle(&mut rng);

        let question = Question::new(
            QuestionId::random(),
            "What is the capital of France?",
            answers,
        );
        tracing::debug!(question_id = %question.id, "fallback question created");
        set.answer_key.insert(question.id, correct);
        set.questions.push(question);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_set_has_requested_count() {
        let set = fallback_question_set(5);
        assert_eq!(set.len(), 5);
        assert_eq!(set.answer_key.len(), 5);
    }

    #[test]
    fn test_fallback_answer_key_points_at_paris() {
        let set = fallback_question_set(3);
        for question in &set.questions {
            let correct = set.answer_key[&question.id];
            let answer = question
                .answers
                .iter()
                .find(|a| a.id == correct)
                .expect("correct answer must be among the options");
            assert_eq!(answer.text, "Paris");
            assert_eq!(question.answers.len(), 4);
        }
    }

    #[test]
    fn test_fallback_ids_are_unique_per_question() {
        let set = fallback_question_set(2);
        assert_ne!(set.questions[0].id, set.questions[1].id);
        let a = set.answer_key[&set.questions[0].id];
        let b = set.answer_key[&set.questions[1].id];
        assert_ne!(a, b);
    }
}
