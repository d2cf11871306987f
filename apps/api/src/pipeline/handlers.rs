//! Axum route handlers for the batch conversion API.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::anyhow;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::oracle::{GeminiClient, Oracle};
use crate::pipeline::variant::TemplateVariant;
use crate::pipeline::{run_batch, FileOutcome, UploadedFile};
use crate::state::AppState;
use crate::trial::trial_exhausted;

/// Uploads above this size are rejected per request.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub batch_id: Uuid,
    pub variant: TemplateVariant,
    pub outcomes: Vec<FileOutcome>,
    pub saved: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_url: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/batches
///
/// Multipart form: repeated `file` parts plus a `variant` text part
/// (`internal | client | client_photo`). An `x-api-key` header supplies a
/// caller-owned oracle key and bypasses trial accounting; without it the
/// server key is used and the trial counter advances once per batch.
pub async fn handle_create_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, AppError> {
    let mut variant: Option<TemplateVariant> = None;
    let mut files: Vec<UploadedFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        match field.name().unwrap_or("") {
            "variant" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable variant field: {e}")))?;
                variant = Some(TemplateVariant::parse(text.trim()).ok_or_else(|| {
                    AppError::Validation(format!(
                        "unknown variant '{}' (expected internal, client, or client_photo)",
                        text.trim()
                    ))
                })?);
            }
            "file" => {
                let name = field.file_name().unwrap_or("resume").to_string();
                let mime = field.content_type().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable upload '{name}': {e}")))?;
                if bytes.len() > MAX_UPLOAD_BYTES {
                    return Err(AppError::Validation(format!(
                        "{name} exceeds the {}MB upload limit",
                        MAX_UPLOAD_BYTES / (1024 * 1024)
                    )));
                }
                files.push(UploadedFile { name, mime, bytes });
            }
            _ => {
                // Unknown parts are drained and ignored.
                let _ = field.bytes().await;
            }
        }
    }

    let variant =
        variant.ok_or_else(|| AppError::Validation("missing 'variant' field".to_string()))?;
    if files.is_empty() {
        return Err(AppError::Validation("no files uploaded".to_string()));
    }

    let oracle = select_oracle(&state, &headers)?;
    let result = run_batch(&state.config, oracle.as_ref(), variant, &files).await?;

    if let Some(path) = &result.archive_path {
        state
            .batches
            .lock()
            .map_err(|_| AppError::Internal(anyhow!("batch registry poisoned")))?
            .insert(result.batch_id, path.clone());
    }

    let archive_url = result
        .archive_path
        .is_some()
        .then(|| format!("/api/v1/batches/{}/archive", result.batch_id));

    Ok(Json(BatchResponse {
        batch_id: result.batch_id,
        variant: result.variant,
        outcomes: result.outcomes,
        saved: result.saved,
        failed: result.failed,
        archive_url,
    }))
}

/// GET /api/v1/batches/:id/archive
///
/// Streams back the ZIP of a batch's saved documents.
pub async fn handle_download_archive(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let path = state
        .batches
        .lock()
        .map_err(|_| AppError::Internal(anyhow!("batch registry poisoned")))?
        .get(&batch_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("batch {batch_id} has no archive")))?;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::Internal(anyhow!("archive read failed: {e}")))?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive.zip".to_string());
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| AppError::Internal(anyhow!("bad archive filename: {e}")))?;

    let headers: [(HeaderName, HeaderValue); 2] = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/zip"),
        ),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, bytes))
}

/// Picks the oracle for this request: the caller's key when supplied,
/// otherwise the server key guarded by the trial counter.
fn select_oracle(state: &AppState, headers: &HeaderMap) -> Result<Arc<dyn Oracle>, AppError> {
    let caller_key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty());

    match caller_key {
        Some(key) => Ok(Arc::new(GeminiClient::new(key.to_string()))),
        None => {
            let attempts = state.trial_uses.load(Ordering::SeqCst);
            if trial_exhausted(attempts, state.config.trial_limit) {
                return Err(AppError::TrialLimitReached);
            }
            let used = state.trial_uses.fetch_add(1, Ordering::SeqCst) + 1;
            info!("trial use {used} of {}", state.config.trial_limit);
            Ok(state.oracle.clone())
        }
    }
}
