use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::repositories::submissions::SubmissionHistoryRow;
use crate::services::exam::SubmissionReceipt;
use crate::services::grading::QuestionResult;

#[derive(Debug, Deserialize)]
pub(crate) struct SubmittedAnswerPayload {
    #[serde(alias = "questionId")]
    pub(crate) question_id: String,
    #[serde(default)]
    #[serde(alias = "answerIds")]
    pub(crate) answer_ids: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamSubmitRequest {
    #[serde(alias = "quizId")]
    #[validate(length(min = 1, message = "quiz_id must not be empty"))]
    pub(crate) quiz_id: String,
    #[serde(default)]
    pub(crate) answers: Vec<SubmittedAnswerPayload>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResultResponse {
    pub(crate) question_id: String,
    pub(crate) content: String,
    pub(crate) score: i32,
    pub(crate) is_correct: bool,
    pub(crate) submitted_answer_ids: Vec<String>,
    pub(crate) correct_answer_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamSubmitResponse {
    pub(crate) submission_id: String,
    pub(crate) user_id: String,
    pub(crate) user_email: String,
    pub(crate) user_full_name: String,
    pub(crate) quiz_id: String,
    pub(crate) quiz_title: String,
    pub(crate) total_questions: i64,
    pub(crate) correct_count: u32,
    pub(crate) wrong_count: u32,
    pub(crate) total_score: f64,
    pub(crate) achieved_score: f64,
    pub(crate) percentage: f64,
    pub(crate) passed: bool,
    pub(crate) submission_time: String,
    pub(crate) question_results: Vec<QuestionResultResponse>,
}

impl ExamSubmitResponse {
    pub(crate) fn from_receipt(receipt: SubmissionReceipt) -> Self {
        let evaluation = receipt.evaluation;
        Self {
            submission_id: receipt.submission_id,
            user_id: receipt.user_id,
            user_email: receipt.user_email,
            user_full_name: receipt.user_full_name,
            quiz_id: receipt.quiz_id,
            quiz_title: receipt.quiz_title,
            total_questions: evaluation.total_questions as i64,
            correct_count: evaluation.correct_count,
            wrong_count: evaluation.wrong_count,
            total_score: evaluation.total_score,
            achieved_score: evaluation.achieved_score,
            percentage: evaluation.percentage,
            passed: evaluation.passed,
            submission_time: format_primitive(receipt.submission_time),
            question_results: evaluation
                .question_results
                .into_iter()
                .map(QuestionResultResponse::from_result)
                .collect(),
        }
    }
}

impl QuestionResultResponse {
    fn from_result(result: QuestionResult) -> Self {
        Self {
            question_id: result.question_id,
            content: result.content,
            score: result.score,
            is_correct: result.is_correct,
            submitted_answer_ids: result.submitted_answer_ids,
            correct_answer_ids: result.correct_answer_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionSummaryResponse {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) quiz_title: String,
    pub(crate) score: f64,
    pub(crate) submission_time: String,
}

impl SubmissionSummaryResponse {
    pub(crate) fn from_row(row: SubmissionHistoryRow) -> Self {
        Self {
            id: row.id,
            quiz_id: row.quiz_id,
            quiz_title: row.quiz_title,
            score: row.score,
            submission_time: format_primitive(row.submission_time),
        }
    }
}
