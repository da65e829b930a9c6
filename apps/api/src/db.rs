use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Idempotent schema. `user_answers.mock_id_ref` deliberately has no foreign key.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS mock_interviews (
        id             SERIAL PRIMARY KEY,
        mock_id        TEXT NOT NULL UNIQUE,
        json_mock_resp TEXT NOT NULL,
        job_position   TEXT NOT NULL,
        job_desc       TEXT NOT NULL,
        job_experience INTEGER NOT NULL CHECK (job_experience >= 0),
        created_by     TEXT NOT NULL,
        created_at     TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS mock_interviews_created_by_idx ON mock_interviews (created_by, id DESC)",
    r#"
    CREATE TABLE IF NOT EXISTS user_answers (
        id             SERIAL PRIMARY KEY,
        mock_id_ref    TEXT NOT NULL,
        question_index INTEGER NOT NULL,
        question       TEXT NOT NULL,
        correct_ans    TEXT NOT NULL,
        user_ans       TEXT NOT NULL,
        feedback       TEXT NOT NULL,
        rating         TEXT NOT NULL,
        user_email     TEXT NOT NULL,
        created_at     TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS user_answers_mock_id_ref_idx ON user_answers (mock_id_ref, id)",
];

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the tables and indexes if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema ready");
    Ok(())
}
