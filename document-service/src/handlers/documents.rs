use crate::dtos::{DocumentResponse, JobResponse, UploadForm, VerificationRequest};
use crate::services::IncomingFile;
use crate::startup::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use service_core::middleware::{ActorRole, FirmContext};
use validator::Validate;

pub const MAX_FILE_BYTES: usize = 20 * 1024 * 1024;

/// Multipart fields: `client_id`, `category` and one or more `file`.
pub async fn upload_documents(
    State(state): State<AppState>,
    ctx: FirmContext,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<JobResponse>), AppError> {
    let mut client_id: Option<String> = None;
    let mut category: Option<String> = None;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "client_id" => client_id = Some(read_text(field).await?),
            "category" => category = Some(read_text(field).await?),
            "file" | "files" => {
                let original_name = field.file_name().unwrap_or("unnamed").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e))
                    })?
                    .to_vec();

                if data.len() > MAX_FILE_BYTES {
                    return Err(AppError::BadRequest(anyhow::anyhow!(
                        "{} is too large (max {} MB)",
                        original_name,
                        MAX_FILE_BYTES / (1024 * 1024)
                    )));
                }
                files.push(IncomingFile {
                    original_name,
                    mime_type,
                    data,
                });
            }
            other => tracing::debug!(field = %other, "Ignoring unknown multipart field"),
        }
    }

    let client_id = match client_id.filter(|c| !c.is_empty()) {
        Some(id) => id,
        None if ctx.role == ActorRole::Client => ctx.user_id.clone(),
        None => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "client_id is required"
            )))
        }
    };
    let form = UploadForm {
        client_id,
        category: category.filter(|c| !c.is_empty()),
    };
    form.validate()?;

    let job = state
        .ingest
        .submit(&ctx, &form.client_id, form.category, files)
        .await?;
    let job = state.orchestrator.dispatch(job).await?;

    Ok((StatusCode::ACCEPTED, Json(JobResponse::from(job))))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map(|t| t.trim().to_string())
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid multipart text field: {}", e)))
}

pub async fn get_job(
    State(state): State<AppState>,
    ctx: FirmContext,
    Path(job_id): Path<String>,
) -> Result<Json<JobResponse>, AppError> {
    let job = state.ingest.get_job(&ctx, &job_id).await?;
    Ok(Json(JobResponse::from(job)))
}

pub async fn get_document(
    State(state): State<AppState>,
    ctx: FirmContext,
    Path(document_id): Path<String>,
) -> Result<Json<DocumentResponse>, AppError> {
    let document = state.documents.get(&ctx, &document_id).await?;
    Ok(Json(DocumentResponse::from(document)))
}

pub async fn delete_document(
    State(state): State<AppState>,
    ctx: FirmContext,
    Path(document_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.documents.delete(&ctx, &document_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn verify_document(
    State(state): State<AppState>,
    ctx: FirmContext,
    Path(document_id): Path<String>,
    Json(payload): Json<VerificationRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    let document = state
        .documents
        .verify(&ctx, &document_id, payload.action)
        .await?;
    Ok(Json(DocumentResponse::from(document)))
}

pub async fn ignore_transaction(
    State(state): State<AppState>,
    ctx: FirmContext,
    Path((document_id, index)): Path<(String, usize)>,
) -> Result<Json<DocumentResponse>, AppError> {
    let document = state
        .documents
        .ignore_transaction(&ctx, &document_id, index)
        .await?;
    Ok(Json(DocumentResponse::from(document)))
}
