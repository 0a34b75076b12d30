use axum::{
    Extension, Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    error::{AppError, Result},
    models::user::AuthenticatedUser,
    state::AppState,
};

/// Hard cap on the batch upload endpoint, enforced before anything leaves
/// this process.
const MAX_UPLOAD_FILES: usize = 4;

/// A file part read out of the incoming multipart body.
struct IncomingFile {
    file_name: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// Drains the multipart body, keeping the parts under the accepted field
/// names and ignoring everything else.
async fn collect_files(multipart: &mut Multipart, accepted: &[&str]) -> Result<Vec<IncomingFile>> {
    let mut files = Vec::new();

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let field_name = field.name().unwrap_or("").to_string();
                if !accepted.contains(&field_name.as_str()) {
                    continue;
                }

                let file_name = field.file_name().unwrap_or("file").to_string();
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Multipart(format!("{}: {}", field_name, e)))?
                    .to_vec();

                files.push(IncomingFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            Ok(None) => break,
            Err(e) => return Err(AppError::Multipart(format!("Parse error: {}", e))),
        }
    }

    Ok(files)
}

/// Re-wraps an incoming file as an outbound multipart part.
///
/// When the browser sent no content type, one is sniffed from the bytes so
/// the upstream still receives something usable.
fn into_part(file: IncomingFile) -> Result<reqwest::multipart::Part> {
    let content_type = file
        .content_type
        .or_else(|| infer::get(&file.data).map(|kind| kind.mime_type().to_string()));

    let mut part = reqwest::multipart::Part::bytes(file.data).file_name(file.file_name);

    if let Some(content_type) = content_type {
        part = part
            .mime_str(&content_type)
            .map_err(|e| AppError::Multipart(format!("Invalid content type: {}", e)))?;
    }

    Ok(part)
}

/// Uploads a single file. The incoming `file` field is forwarded to the
/// upstream under its `files` field name.
#[axum::debug_handler]
pub async fn upload_single(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut files = collect_files(&mut multipart, &["file"]).await?;
    let file = files
        .pop()
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    tracing::info!("📤 Uploading file: {} ({} bytes)", file.file_name, file.data.len());

    let form = reqwest::multipart::Form::new().part("files", into_part(file)?);

    let data = state
        .upstream
        .forward_multipart("/upload", &current.access_token, form)
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Uploads a batch of files under the upstream's `files` field.
///
/// More than `MAX_UPLOAD_FILES` files is refused locally; the upstream is
/// never contacted for an oversized batch.
#[axum::debug_handler]
pub async fn upload_multiple(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    mut multipart: Multipart,
) -> Result<Response> {
    let files = collect_files(&mut multipart, &["files", "file"]).await?;

    if files.is_empty() {
        return Err(AppError::Validation("No files provided".to_string()));
    }

    if files.len() > MAX_UPLOAD_FILES {
        return Err(AppError::Validation(format!(
            "A maximum of {} files can be uploaded at once",
            MAX_UPLOAD_FILES
        )));
    }

    tracing::info!("📤 Uploading {} files", files.len());

    let mut form = reqwest::multipart::Form::new();
    for file in files {
        form = form.part("files", into_part(file)?);
    }

    let data = state
        .upstream
        .forward_multipart("/upload/multiple", &current.access_token, form)
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}

/// Uploads an audit report. The incoming `file` field is forwarded to the
/// upstream under its `report` field name.
#[axum::debug_handler]
pub async fn upload_audit_report(
    State(state): State<AppState>,
    Extension(current): Extension<AuthenticatedUser>,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut files = collect_files(&mut multipart, &["file", "report"]).await?;
    let file = files
        .pop()
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    tracing::info!("📤 Uploading audit report: {}", file.file_name);

    let form = reqwest::multipart::Form::new().part("report", into_part(file)?);

    let data = state
        .upstream
        .forward_multipart("/upload/audit-report", &current.access_token, form)
        .await?;

    Ok((StatusCode::OK, Json(data)).into_response())
}
