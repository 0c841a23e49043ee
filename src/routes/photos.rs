//! Photo upload endpoint
//!
//! `POST /photos` takes a multipart form with one file part, `imageFile`,
//! and stores it in the configured Drive folder under a name derived from
//! the current local time.

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        DefaultBodyLimit, State,
    },
    middleware,
    routing::post,
    Json, Router,
};
use chrono::Local;
use tracing::{error, info};

use crate::middleware::auth_middleware;
use crate::models::{AppState, UploadResponse};
use crate::storage::{FileContent, NewFile};
use crate::types::{AppError, AppResult};

pub const IMAGE_FIELD: &str = "imageFile";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/photos", post(upload_photo))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

async fn upload_photo(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|e| AppError::MissingFile(e.body_text()))?;
    let content = read_image_part(&mut multipart).await?;

    let session = state.storage.open_session().await.map_err(|e| {
        error!("Failed to open storage session: {}", e);
        AppError::Session(e.to_string())
    })?;

    let file = NewFile::photo(&state.config.storage.folder_id, &Local::now());
    let name = file.name.clone();
    let size = content.data.len();

    let stored = session.create_file(file, content).await.map_err(|e| {
        error!("Failed to create {}: {}", name, e);
        AppError::CreateFile(e.to_string())
    })?;

    info!("Stored {} ({} bytes) as {}", name, size, stored.id);

    Ok(Json(UploadResponse { file_id: stored.id }))
}

/// Find the `imageFile` file part and buffer its body. Parts with other
/// names, or an `imageFile` sent as a plain text field, are skipped.
async fn read_image_part(multipart: &mut Multipart) -> AppResult<FileContent> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| AppError::MissingFile(e.body_text()))?;

        let Some(field) = field else {
            return Err(AppError::MissingFile(format!(
                "no {} file part in request",
                IMAGE_FIELD
            )));
        };

        if field.name() != Some(IMAGE_FIELD) || field.file_name().is_none() {
            continue;
        }

        let mime_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::UnreadableFile(e.body_text()))?;

        return Ok(FileContent { data, mime_type });
    }
}
