use std::io;

use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use common::storage::{BoxReader, StorageError, StoredUpload, UploadStore};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, Capability};
use crate::models::upload::UploadResponse;
use crate::state::AppState;
use crate::utils::filename::upload_extension;

/// Headroom on top of the file size limit for multipart framing.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Body limit layer for the upload route.
pub fn upload_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    let limit = max_upload_size.saturating_add(MULTIPART_OVERHEAD);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "Uploads",
    operation_id = "uploadFile",
    summary = "Upload a file",
    description = "Accepts `multipart/form-data` with a single `file` field. The file is stored \
        under a generated name and served back at the returned path. Requires the admin or \
        leader role.",
    request_body(content_type = "multipart/form-data", description = "Form with a `file` field"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing file or file too large (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID, PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    auth_user.require(Capability::UploadFiles)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart data: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let extension = match field.file_name() {
            Some(name) => upload_extension(name)
                .map_err(|e| AppError::Validation(e.message().into()))?
                .map(str::to_string),
            None => None,
        };

        let stored = stream_field_to_store(field, &*state.uploads, extension.as_deref()).await?;

        tracing::info!(name = %stored.name, size = stored.size, "File uploaded");

        return Ok(Json(UploadResponse {
            file_path: format!("/uploads/{}", stored.name),
        }));
    }

    Err(AppError::Validation("Missing 'file' field".into()))
}

/// Stream a multipart field into the upload store.
///
/// The store enforces the size limit. Body read failures are tagged `InvalidData`
/// and reported as validation errors.
async fn stream_field_to_store(
    field: Field<'_>,
    store: &dyn UploadStore,
    extension: Option<&str>,
) -> Result<StoredUpload, AppError> {
    let body = field.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e));
    let reader: BoxReader<'_> = Box::new(Box::pin(StreamReader::new(body)));

    store
        .put_stream(extension, reader)
        .await
        .map_err(|err| match err {
            StorageError::Io(e) if e.kind() == io::ErrorKind::InvalidData => {
                AppError::Validation(format!("Upload read error: {e}"))
            }
            other => other.into(),
        })
}
