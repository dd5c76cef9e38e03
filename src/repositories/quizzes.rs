use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{AnswerOption, Question, Quiz};

pub(crate) const COLUMNS: &str =
    "id, title, description, duration_minutes, is_active, created_at, updated_at";

const QUESTION_COLUMNS: &str =
    "id, quiz_id, content, qtype, score, position, created_at, updated_at";

const OPTION_COLUMNS: &str = "id, question_id, content, is_correct, position, created_at";

/// A question carrying its full answer key. Built eagerly by
/// [`find_with_questions_and_answers`] so grading never reaches back
/// into the store mid-computation.
#[derive(Debug, Clone)]
pub(crate) struct HydratedQuestion {
    pub(crate) question: Question,
    pub(crate) options: Vec<AnswerOption>,
}

#[derive(Debug, Clone)]
pub(crate) struct HydratedQuiz {
    pub(crate) quiz: Quiz,
    pub(crate) questions: Vec<HydratedQuestion>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QuizWithCount {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) duration_minutes: i32,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
    pub(crate) question_count: i64,
}

pub(crate) struct CreateQuiz<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub duration_minutes: i32,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateQuiz<'_>) -> Result<Quiz, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "INSERT INTO quizzes (
            id, title, description, duration_minutes, is_active, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,TRUE,$5,$6)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.duration_minutes)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_active_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "SELECT {COLUMNS} FROM quizzes WHERE id = $1 AND is_active = TRUE",
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn exists_by_title(pool: &PgPool, title: &str) -> Result<bool, sqlx::Error> {
    let existing: Option<String> = sqlx::query_scalar("SELECT id FROM quizzes WHERE title = $1")
        .bind(title)
        .fetch_optional(pool)
        .await?;
    Ok(existing.is_some())
}

pub(crate) async fn list_active(
    pool: &PgPool,
    skip: i64,
    limit: i64,
) -> Result<Vec<QuizWithCount>, sqlx::Error> {
    sqlx::query_as::<_, QuizWithCount>(
        "SELECT q.id, q.title, q.description, q.duration_minutes, q.is_active,
                q.created_at, q.updated_at,
                (SELECT COUNT(*) FROM questions WHERE quiz_id = q.id) AS question_count
         FROM quizzes q WHERE q.is_active = TRUE
         ORDER BY q.created_at, q.id OFFSET $1 LIMIT $2",
    )
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_active(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM quizzes WHERE is_active = TRUE").fetch_one(pool).await
}

pub(crate) async fn question_count(pool: &PgPool, quiz_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE quiz_id = $1")
        .bind(quiz_id)
        .fetch_one(pool)
        .await
}

pub(crate) struct UpdateQuiz {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(pool: &PgPool, id: &str, params: UpdateQuiz) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE quizzes SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            duration_minutes = COALESCE($3, duration_minutes),
            updated_at = $4
         WHERE id = $5",
    )
    .bind(params.title)
    .bind(params.description)
    .bind(params.duration_minutes)
    .bind(params.updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn soft_delete(
    pool: &PgPool,
    id: &str,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE quizzes SET is_active = FALSE, updated_at = $1 WHERE id = $2")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Attach existing questions to a quiz, appending them after the
/// current last position. Runs in one transaction so a partially
/// attached batch is never observable.
pub(crate) async fn attach_questions(
    pool: &PgPool,
    quiz_id: &str,
    question_ids: &[String],
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let last_position: i32 =
        sqlx::query_scalar("SELECT COALESCE(MAX(position), 0) FROM questions WHERE quiz_id = $1")
            .bind(quiz_id)
            .fetch_one(&mut *tx)
            .await?;

    for (index, question_id) in question_ids.iter().enumerate() {
        sqlx::query(
            "UPDATE questions SET quiz_id = $1, position = $2, updated_at = $3 WHERE id = $4",
        )
        .bind(quiz_id)
        .bind(last_position + 1 + index as i32)
        .bind(now)
        .bind(question_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Load a quiz together with its questions and every question's answer
/// options in a single transaction, so grading runs against one
/// consistent snapshot of the answer key. Returns the quiz regardless
/// of its active flag; callers decide whether inactive is acceptable.
pub(crate) async fn find_with_questions_and_answers(
    pool: &PgPool,
    id: &str,
) -> Result<Option<HydratedQuiz>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let quiz = sqlx::query_as::<_, Quiz>(&format!("SELECT {COLUMNS} FROM quizzes WHERE id = $1"))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(quiz) = quiz else {
        tx.commit().await?;
        return Ok(None);
    };

    let questions = sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions
         WHERE quiz_id = $1 ORDER BY position, created_at",
    ))
    .bind(id)
    .fetch_all(&mut *tx)
    .await?;

    let question_ids: Vec<String> = questions.iter().map(|question| question.id.clone()).collect();

    let options = sqlx::query_as::<_, AnswerOption>(&format!(
        "SELECT {OPTION_COLUMNS} FROM answer_options
         WHERE question_id = ANY($1) ORDER BY position, created_at",
    ))
    .bind(&question_ids)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;

    let mut grouped: std::collections::HashMap<String, Vec<AnswerOption>> =
        std::collections::HashMap::with_capacity(questions.len());
    for option in options {
        grouped.entry(option.question_id.clone()).or_default().push(option);
    }

    let questions = questions
        .into_iter()
        .map(|question| {
            let options = grouped.remove(&question.id).unwrap_or_default();
            HydratedQuestion { question, options }
        })
        .collect();

    Ok(Some(HydratedQuiz { quiz, questions }))
}
