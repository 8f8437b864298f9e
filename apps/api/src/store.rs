//! Persistence boundary for analyzed résumés.
//!
//! `AppState` holds an `Arc<dyn ResumeStore>`; Postgres in production, an
//! in-memory store in tests.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::resume::{CandidateRecord, ResumeRow, ResumeSummary, StoredResume};

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Persists a record, assigning its id and upload timestamp.
    async fn save(&self, record: &CandidateRecord) -> Result<StoredResume, sqlx::Error>;

    /// All stored résumés, newest first.
    async fn list(&self) -> Result<Vec<ResumeSummary>, sqlx::Error>;

    async fn get(&self, id: Uuid) -> Result<Option<StoredResume>, sqlx::Error>;
}

pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn save(&self, record: &CandidateRecord) -> Result<StoredResume, sqlx::Error> {
        let row: ResumeRow = sqlx::query_as(
            r#"
            INSERT INTO resumes
                (id, file_name, name, email, phone, linkedin_url, portfolio_url, summary,
                 work_experience, education, technical_skills, soft_skills, projects,
                 certifications, resume_rating, improvement_areas, upskill_suggestions)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&record.file_name)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.linkedin_url)
        .bind(&record.portfolio_url)
        .bind(&record.summary)
        .bind(Json(&record.work_experience))
        .bind(Json(&record.education))
        .bind(Json(&record.technical_skills))
        .bind(Json(&record.soft_skills))
        .bind(Json(&record.projects))
        .bind(Json(&record.certifications))
        .bind(record.resume_rating)
        .bind(&record.improvement_areas)
        .bind(Json(&record.upskill_suggestions))
        .fetch_one(&self.pool)
        .await?;

        info!("Stored résumé {} ({})", row.id, row.file_name);
        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<ResumeSummary>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, email, uploaded_at FROM resumes ORDER BY uploaded_at DESC")
            .fetch_all(&self.pool)
            .await
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredResume>, sqlx::Error> {
        let row: Option<ResumeRow> = sqlx::query_as("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(StoredResume::from))
    }
}
