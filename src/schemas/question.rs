use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{AnswerOption, Question};
use crate::db::types::QuestionType;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub(crate) struct AnswerOptionCreate {
    #[validate(length(min = 1, message = "answer content must not be empty"))]
    pub(crate) content: String,
    #[serde(default)]
    #[serde(alias = "isCorrect")]
    pub(crate) is_correct: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub(crate) content: String,
    #[serde(alias = "type")]
    pub(crate) qtype: QuestionType,
    #[validate(range(min = 0, message = "score must be non-negative"))]
    pub(crate) score: i32,
    #[validate(length(min = 2, message = "a question needs at least 2 answer options"), nested)]
    pub(crate) answers: Vec<AnswerOptionCreate>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) quiz_id: Option<String>,
    pub(crate) content: String,
    #[serde(rename = "type")]
    pub(crate) qtype: QuestionType,
    pub(crate) score: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl QuestionResponse {
    pub(crate) fn from_db(question: Question) -> Self {
        Self {
            id: question.id,
            quiz_id: question.quiz_id,
            content: question.content,
            qtype: question.qtype,
            score: question.score,
            created_at: format_primitive(question.created_at),
            updated_at: format_primitive(question.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerOptionResponse {
    pub(crate) id: String,
    pub(crate) content: String,
    pub(crate) is_correct: bool,
}

impl AnswerOptionResponse {
    pub(crate) fn from_db(option: AnswerOption) -> Self {
        Self { id: option.id, content: option.content, is_correct: option.is_correct }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionDetailResponse {
    #[serde(flatten)]
    pub(crate) question: QuestionResponse,
    pub(crate) answers: Vec<AnswerOptionResponse>,
}
