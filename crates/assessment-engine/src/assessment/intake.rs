use std::collections::HashSet;

use serde_json::Value;

use super::domain::{
    InvalidCategoryCode, LikertValue, Question, QuestionId, ResponseMap, ResultKey, TestId,
};
use super::formulas::FormulaError;

/// Structural problems with engine inputs. Never partially applied.
#[derive(Debug, thiserror::Error)]
pub enum InputViolation {
    #[error("responses payload must be an object keyed by question id")]
    NotAnObject,
    #[error("answer for question '{question_id}' is not an integer")]
    NonInteger { question_id: QuestionId },
    #[error("answer {value} for question '{question_id}' is outside 1..=5")]
    OutOfRange { question_id: QuestionId, value: i64 },
    #[error("question '{0}' is not part of this test")]
    UnknownQuestion(QuestionId),
    #[error(transparent)]
    UnknownCategory(#[from] InvalidCategoryCode),
    #[error(transparent)]
    Formula(#[from] FormulaError),
    #[error("test '{0}' has no questions")]
    EmptyQuestionnaire(TestId),
    #[error("result {0} is already completed")]
    SessionCompleted(ResultKey),
    #[error("result {0} has not been completed")]
    NotCompleted(ResultKey),
}

/// Coerce an untyped answers payload into a typed response map.
///
/// When `questions` is given, every key must name one of them.
pub fn parse_responses(
    payload: &Value,
    questions: Option<&[Question]>,
) -> Result<ResponseMap, InputViolation> {
    let object = payload.as_object().ok_or(InputViolation::NotAnObject)?;
    let known: Option<HashSet<&str>> = questions.map(|questions| {
        questions
            .iter()
            .map(|question| question.id.0.as_str())
            .collect()
    });

    let mut responses = ResponseMap::new();
    for (key, value) in object {
        let question_id = QuestionId(key.clone());

        if let Some(known) = &known {
            if !known.contains(key.as_str()) {
                return Err(InputViolation::UnknownQuestion(question_id));
            }
        }

        let raw = match value {
            Value::Number(number) => number.as_i64(),
            _ => None,
        };
        let Some(raw) = raw else {
            return Err(InputViolation::NonInteger { question_id });
        };

        let value = LikertValue::try_from(raw)
            .map_err(|_| InputViolation::OutOfRange {
                question_id: question_id.clone(),
                value: raw,
            })?;
        responses.insert(question_id, value);
    }

    Ok(responses)
}

/// Reject answers to questions outside the test.
pub fn ensure_known_questions(
    responses: &ResponseMap,
    questions: &[Question],
) -> Result<(), InputViolation> {
    let known: HashSet<&QuestionId> = questions.iter().map(|question| &question.id).collect();
    match responses.keys().find(|id| !known.contains(id)) {
        Some(unknown) => Err(InputViolation::UnknownQuestion(unknown.clone())),
        None => Ok(()),
    }
}
