use sqlx::Row;

fn database_url() -> Option<String> {
    // Load .env so POSTGRES_* from .env are available (integration tests don't use app config)
    dotenvy::dotenv().ok();

    if let Ok(url) = std::env::var("DATABASE_URL") {
        if !url.trim().is_empty() {
            return Some(url);
        }
    }

    None
}

#[tokio::test]
async fn migrations_apply_and_tables_exist() -> anyhow::Result<()> {
    // Opt-in smoke test: needs a reachable Postgres.
    let opted_in =
        std::env::var("QUIZMARK_MIGRATIONS_SMOKE").map(|value| value == "1").unwrap_or(false);
    if !opted_in {
        eprintln!("QUIZMARK_MIGRATIONS_SMOKE not set; skipping");
        return Ok(());
    }

    let Some(database_url) = database_url() else {
        anyhow::bail!("DATABASE_URL is not set");
    };

    let pool =
        sqlx::postgres::PgPoolOptions::new().max_connections(1).connect(&database_url).await?;

    let migrations_dir =
        std::env::var("QUIZMARK_MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string());
    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new(&migrations_dir)).await?;
    migrator.run(&pool).await?;

    let tables = ["users", "quizzes", "questions", "answer_options", "quiz_submissions"];

    for table in tables {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_name = $1",
        )
        .bind(table)
        .fetch_one(&pool)
        .await?;

        let count: i64 = row.try_get("count")?;
        anyhow::ensure!(count == 1, "table {table} missing after migrations");
    }

    Ok(())
}
