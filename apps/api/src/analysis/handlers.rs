use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::analysis::extract::DocumentType;
use crate::analysis::pipeline::Upload;
use crate::errors::AppError;
use crate::models::resume::{ResumeSummary, StoredResume};
use crate::state::AppState;
use crate::views::ResumeDetail;

/// Multipart field carrying the résumé file.
pub const UPLOAD_FIELD: &str = "resume";

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("unnamed").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        let document_type = DocumentType::from_declared(content_type.as_deref(), &file_name);

        return Ok(Upload {
            bytes,
            file_name,
            document_type,
        });
    }

    Err(AppError::Validation(format!(
        "No file uploaded in field '{UPLOAD_FIELD}'"
    )))
}

/// POST /api/resumes/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<StoredResume>), AppError> {
    let upload = read_upload(&mut multipart).await?;
    let record = state.analyzer.analyze(upload).await?;
    let stored = state.store.save(&record).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeSummary>>, AppError> {
    let summaries = state.store.list().await?;
    info!("Listing {} stored résumés", summaries.len());
    Ok(Json(summaries))
}

/// GET /api/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeDetail>, AppError> {
    let stored = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(ResumeDetail::from(stored)))
}
