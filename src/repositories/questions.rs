use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::{AnswerOption, Question};
use crate::db::types::QuestionType;

const COLUMNS: &str = "id, quiz_id, content, qtype, score, position, created_at, updated_at";

const OPTION_COLUMNS: &str = "id, question_id, content, is_correct, position, created_at";

pub(crate) struct CreateAnswerOption {
    pub content: String,
    pub is_correct: bool,
}

pub(crate) struct CreateQuestion<'a> {
    pub id: &'a str,
    pub content: &'a str,
    pub qtype: QuestionType,
    pub score: i32,
    pub options: Vec<CreateAnswerOption>,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

/// Insert the question and its answer options in one transaction.
pub(crate) async fn create(
    pool: &PgPool,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let question = sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (id, content, qtype, score, position, created_at, updated_at)
         VALUES ($1,$2,$3,$4,0,$5,$6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.content)
    .bind(params.qtype)
    .bind(params.score)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(&mut *tx)
    .await?;

    insert_options(&mut tx, params.id, &params.options, params.created_at).await?;

    tx.commit().await?;
    Ok(question)
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn options_for_question(
    pool: &PgPool,
    question_id: &str,
) -> Result<Vec<AnswerOption>, sqlx::Error> {
    sqlx::query_as::<_, AnswerOption>(&format!(
        "SELECT {OPTION_COLUMNS} FROM answer_options
         WHERE question_id = $1 ORDER BY position, created_at",
    ))
    .bind(question_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_existing_ids(
    pool: &PgPool,
    ids: &[String],
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM questions WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
}

pub(crate) async fn list(
    pool: &PgPool,
    skip: i64,
    limit: i64,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions ORDER BY created_at, id OFFSET $1 LIMIT $2",
    ))
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM questions").fetch_one(pool).await
}

pub(crate) struct ReplaceQuestion {
    pub content: String,
    pub qtype: QuestionType,
    pub score: i32,
    pub options: Vec<CreateAnswerOption>,
    pub updated_at: PrimitiveDateTime,
}

/// Update the question fields and replace its entire answer key in one
/// transaction. The old options are dropped wholesale; a mixed key is
/// never observable.
pub(crate) async fn replace(
    pool: &PgPool,
    id: &str,
    params: ReplaceQuestion,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE questions SET content = $1, qtype = $2, score = $3, updated_at = $4 WHERE id = $5",
    )
    .bind(&params.content)
    .bind(params.qtype)
    .bind(params.score)
    .bind(params.updated_at)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM answer_options WHERE question_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    insert_options(&mut tx, id, &params.options, params.updated_at).await?;

    tx.commit().await?;
    Ok(())
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM questions WHERE id = $1").bind(id).execute(pool).await?;
    Ok(())
}

async fn insert_options(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    question_id: &str,
    options: &[CreateAnswerOption],
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    for (index, option) in options.iter().enumerate() {
        sqlx::query(
            "INSERT INTO answer_options (id, question_id, content, is_correct, position, created_at)
             VALUES ($1,$2,$3,$4,$5,$6)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(question_id)
        .bind(&option.content)
        .bind(option.is_correct)
        .bind(index as i32)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
