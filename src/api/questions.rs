use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::pagination::{ListQuery, PaginatedResponse};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Question;
use crate::db::types::QuestionType;
use crate::repositories;
use crate::schemas::question::{
    AnswerOptionCreate, AnswerOptionResponse, QuestionCreate, QuestionDetailResponse,
    QuestionResponse,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_questions).post(create_question))
        .route("/:question_id", get(get_question).put(replace_question).delete(delete_question))
}

async fn create_question(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<QuestionCreate>,
) -> Result<(StatusCode, Json<QuestionDetailResponse>), ApiError> {
    payload.validate().map_err(|err| ApiError::BadRequest(err.to_string()))?;
    validate_answer_key(payload.qtype, &payload.answers)?;

    let now = primitive_now_utc();
    let question_id = Uuid::new_v4().to_string();

    let question = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            id: &question_id,
            content: payload.content.trim(),
            qtype: payload.qtype,
            score: payload.score,
            options: to_create_options(payload.answers),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    let response = detail_response(&state, question).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_questions(
    CurrentAdmin(_admin): CurrentAdmin,
    Query(query): Query<ListQuery>,
    State(state): State<AppState>,
) -> Result<Json<PaginatedResponse<QuestionResponse>>, ApiError> {
    let questions = repositories::questions::list(state.db(), query.skip, query.limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;
    let total_count = repositories::questions::count(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count questions"))?;

    Ok(Json(PaginatedResponse {
        items: questions.into_iter().map(QuestionResponse::from_db).collect(),
        total_count,
        skip: query.skip,
        limit: query.limit,
    }))
}

async fn get_question(
    Path(question_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<QuestionDetailResponse>, ApiError> {
    let question = fetch_question(&state, &question_id).await?;
    let response = detail_response(&state, question).await?;
    Ok(Json(response))
}

async fn replace_question(
    Path(question_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<QuestionCreate>,
) -> Result<Json<QuestionDetailResponse>, ApiError> {
    payload.validate().map_err(|err| ApiError::BadRequest(err.to_string()))?;
    validate_answer_key(payload.qtype, &payload.answers)?;

    let question = fetch_question(&state, &question_id).await?;

    repositories::questions::replace(
        state.db(),
        &question.id,
        repositories::questions::ReplaceQuestion {
            content: payload.content.trim().to_string(),
            qtype: payload.qtype,
            score: payload.score,
            options: to_create_options(payload.answers),
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update question"))?;

    let updated = fetch_question(&state, &question.id).await?;
    let response = detail_response(&state, updated).await?;
    Ok(Json(response))
}

async fn delete_question(
    Path(question_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let question = fetch_question(&state, &question_id).await?;

    repositories::questions::delete_by_id(state.db(), &question.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question"))?;

    Ok(StatusCode::NO_CONTENT)
}

/// The grading rules need a usable answer key: at least one correct
/// option, and exactly one for single choice questions.
fn validate_answer_key(qtype: QuestionType, answers: &[AnswerOptionCreate]) -> Result<(), ApiError> {
    let correct = answers.iter().filter(|answer| answer.is_correct).count();

    if correct == 0 {
        return Err(ApiError::BadRequest(
            "At least one answer option must be marked correct".to_string(),
        ));
    }

    if qtype == QuestionType::SingleChoice && correct != 1 {
        return Err(ApiError::BadRequest(
            "A single choice question must have exactly one correct option".to_string(),
        ));
    }

    Ok(())
}

fn to_create_options(
    answers: Vec<AnswerOptionCreate>,
) -> Vec<repositories::questions::CreateAnswerOption> {
    answers
        .into_iter()
        .map(|answer| repositories::questions::CreateAnswerOption {
            content: answer.content.trim().to_string(),
            is_correct: answer.is_correct,
        })
        .collect()
}

async fn detail_response(
    state: &AppState,
    question: Question,
) -> Result<QuestionDetailResponse, ApiError> {
    let options = repositories::questions::options_for_question(state.db(), &question.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch answer options"))?;

    Ok(QuestionDetailResponse {
        question: QuestionResponse::from_db(question),
        answers: options.into_iter().map(AnswerOptionResponse::from_db).collect(),
    })
}

async fn fetch_question(state: &AppState, question_id: &str) -> Result<Question, ApiError> {
    repositories::questions::find_by_id(state.db(), question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?
        .ok_or_else(|| ApiError::NotFound(format!("Question not found: {question_id}")))
}
