use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

const CREATE_RESUMES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS resumes (
    id                  UUID PRIMARY KEY,
    file_name           TEXT NOT NULL,
    name                TEXT,
    email               TEXT,
    phone               TEXT,
    linkedin_url        TEXT,
    portfolio_url       TEXT,
    summary             TEXT,
    work_experience     JSONB NOT NULL DEFAULT '[]',
    education           JSONB NOT NULL DEFAULT '[]',
    technical_skills    JSONB NOT NULL DEFAULT '[]',
    soft_skills         JSONB NOT NULL DEFAULT '[]',
    projects            JSONB NOT NULL DEFAULT '[]',
    certifications      JSONB NOT NULL DEFAULT '[]',
    resume_rating       DOUBLE PRECISION CHECK (resume_rating BETWEEN 1 AND 10),
    improvement_areas   TEXT,
    upskill_suggestions JSONB NOT NULL DEFAULT '[]',
    uploaded_at         TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

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

/// Creates the `resumes` table if it does not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(CREATE_RESUMES_TABLE).execute(pool).await?;
    info!("Database schema ready");
    Ok(())
}
