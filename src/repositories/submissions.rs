use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::QuizSubmission;

const COLUMNS: &str = "id, user_id, quiz_id, score, submission_time, created_at";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SubmissionHistoryRow {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) quiz_title: String,
    pub(crate) score: f64,
    pub(crate) submission_time: PrimitiveDateTime,
}

pub(crate) struct CreateSubmission<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub quiz_id: &'a str,
    pub score: f64,
    pub submission_time: PrimitiveDateTime,
    pub created_at: PrimitiveDateTime,
}

/// Append one submission record. The insert runs inside an explicit
/// transaction: either the row is durably written or nothing is. There
/// is deliberately no update or delete counterpart in this module.
pub(crate) async fn create(
    pool: &PgPool,
    params: CreateSubmission<'_>,
) -> Result<QuizSubmission, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let submission = sqlx::query_as::<_, QuizSubmission>(&format!(
        "INSERT INTO quiz_submissions (id, user_id, quiz_id, score, submission_time, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.quiz_id)
    .bind(params.score)
    .bind(params.submission_time)
    .bind(params.created_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(submission)
}

pub(crate) async fn list_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<SubmissionHistoryRow>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionHistoryRow>(
        "SELECT s.id, s.quiz_id, q.title AS quiz_title, s.score, s.submission_time
         FROM quiz_submissions s
         JOIN quizzes q ON q.id = s.quiz_id
         WHERE s.user_id = $1
         ORDER BY s.submission_time DESC, s.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
