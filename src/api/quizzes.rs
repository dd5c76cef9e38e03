use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::pagination::{ListQuery, PaginatedResponse};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Quiz;
use crate::repositories;
use crate::schemas::quiz::{AddQuestionsRequest, QuizCreate, QuizResponse, QuizUpdate};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_quizzes).post(create_quiz))
        .route("/:quiz_id", get(get_quiz).patch(update_quiz).delete(delete_quiz))
        .route("/:quiz_id/questions", post(add_questions))
}

async fn create_quiz(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<QuizCreate>,
) -> Result<(StatusCode, Json<QuizResponse>), ApiError> {
    payload.validate().map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let duplicate = repositories::quizzes::exists_by_title(state.db(), payload.title.trim())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check quiz title"))?;
    if duplicate {
        return Err(ApiError::Conflict("Quiz with this title already exists".to_string()));
    }

    let now = primitive_now_utc();
    let quiz = repositories::quizzes::create(
        state.db(),
        repositories::quizzes::CreateQuiz {
            id: &Uuid::new_v4().to_string(),
            title: payload.title.trim(),
            description: payload.description.as_deref(),
            duration_minutes: payload.duration_minutes,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create quiz"))?;

    Ok((StatusCode::CREATED, Json(QuizResponse::from_db(quiz, 0))))
}

async fn list_quizzes(
    CurrentUser(_user): CurrentUser,
    Query(query): Query<ListQuery>,
    State(state): State<AppState>,
) -> Result<Json<PaginatedResponse<QuizResponse>>, ApiError> {
    let quizzes = repositories::quizzes::list_active(state.db(), query.skip, query.limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list quizzes"))?;
    let total_count = repositories::quizzes::count_active(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count quizzes"))?;

    Ok(Json(PaginatedResponse {
        items: quizzes.into_iter().map(QuizResponse::from_row).collect(),
        total_count,
        skip: query.skip,
        limit: query.limit,
    }))
}

async fn get_quiz(
    Path(quiz_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<QuizResponse>, ApiError> {
    let quiz = fetch_active_quiz(&state, &quiz_id).await?;
    let question_count = repositories::quizzes::question_count(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count quiz questions"))?;

    Ok(Json(QuizResponse::from_db(quiz, question_count)))
}

async fn update_quiz(
    Path(quiz_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<QuizUpdate>,
) -> Result<Json<QuizResponse>, ApiError> {
    payload.validate().map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let quiz = fetch_active_quiz(&state, &quiz_id).await?;

    repositories::quizzes::update(
        state.db(),
        &quiz.id,
        repositories::quizzes::UpdateQuiz {
            title: payload.title.map(|title| title.trim().to_string()),
            description: payload.description,
            duration_minutes: payload.duration_minutes,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update quiz"))?;

    let updated = fetch_active_quiz(&state, &quiz.id).await?;
    let question_count = repositories::quizzes::question_count(state.db(), &updated.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count quiz questions"))?;

    Ok(Json(QuizResponse::from_db(updated, question_count)))
}

async fn delete_quiz(
    Path(quiz_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let quiz = fetch_active_quiz(&state, &quiz_id).await?;

    repositories::quizzes::soft_delete(state.db(), &quiz.id, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to deactivate quiz"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn add_questions(
    Path(quiz_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<AddQuestionsRequest>,
) -> Result<Json<QuizResponse>, ApiError> {
    payload.validate().map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let quiz = fetch_active_quiz(&state, &quiz_id).await?;

    let unique: HashSet<&String> = payload.question_ids.iter().collect();
    if unique.len() != payload.question_ids.len() {
        return Err(ApiError::BadRequest("Duplicate question ids in request".to_string()));
    }

    let existing = repositories::questions::find_existing_ids(state.db(), &payload.question_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check questions"))?;

    if existing.len() != payload.question_ids.len() {
        let known: HashSet<&String> = existing.iter().collect();
        let missing: Vec<&str> = payload
            .question_ids
            .iter()
            .filter(|id| !known.contains(id))
            .map(String::as_str)
            .collect();
        return Err(ApiError::BadRequest(format!(
            "Some questions not found: {}",
            missing.join(", ")
        )));
    }

    repositories::quizzes::attach_questions(
        state.db(),
        &quiz.id,
        &payload.question_ids,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to attach questions"))?;

    let question_count = repositories::quizzes::question_count(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count quiz questions"))?;

    Ok(Json(QuizResponse::from_db(quiz, question_count)))
}

async fn fetch_active_quiz(state: &AppState, quiz_id: &str) -> Result<Quiz, ApiError> {
    repositories::quizzes::find_active_by_id(state.db(), quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?
        .ok_or_else(|| ApiError::NotFound(format!("Quiz not found: {quiz_id}")))
}
