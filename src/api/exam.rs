use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::exam::{ExamSubmitRequest, ExamSubmitResponse, SubmissionSummaryResponse};
use crate::services::exam::{SubmitError, SubmittedAnswer};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/submit", post(submit_exam))
        .route("/submissions", get(my_submissions))
}

async fn submit_exam(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ExamSubmitRequest>,
) -> Result<Json<ExamSubmitResponse>, ApiError> {
    payload.validate().map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let answers: Vec<SubmittedAnswer> = payload
        .answers
        .into_iter()
        .map(|answer| SubmittedAnswer {
            question_id: answer.question_id,
            answer_ids: answer.answer_ids,
        })
        .collect();

    let receipt = state
        .exam()
        .submit(&user.id, &payload.quiz_id, &answers)
        .await
        .map_err(map_submit_error)?;

    Ok(Json(ExamSubmitResponse::from_receipt(receipt)))
}

async fn my_submissions(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionSummaryResponse>>, ApiError> {
    let rows = repositories::submissions::list_for_user(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch submissions"))?;

    Ok(Json(rows.into_iter().map(SubmissionSummaryResponse::from_row).collect()))
}

fn map_submit_error(error: SubmitError) -> ApiError {
    match error {
        SubmitError::UserNotFound(_) | SubmitError::QuizNotFound(_) => {
            ApiError::NotFound(error.to_string())
        }
        SubmitError::Validation(message) => ApiError::BadRequest(message),
        SubmitError::Store(err) => ApiError::internal(err, "Failed to store submission"),
    }
}
