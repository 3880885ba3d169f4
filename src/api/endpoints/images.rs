//! Image ingestion endpoints.
//!
//! `POST /api/upload-image`: multipart upload into the pipeline.
//! `GET /api/images/:id`: record lookup.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::ImageRecord;

/// `POST /api/upload-image`: run the ingestion pipeline on the
/// uploaded file and return the new record.
///
/// Expects one multipart field named `file` carrying the image bytes;
/// the field's filename drives format detection.
pub async fn upload(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<ImageRecord>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| ApiError::BadRequest("Upload field has no filename".into()))?
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;

        let record = ctx.pipeline.process(&bytes, &filename)?;
        return Ok(Json(record));
    }

    Err(ApiError::BadRequest("No file field in upload".into()))
}

/// `GET /api/images/:id`: fetch an ingested image record.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ImageRecord>, ApiError> {
    let record = ctx
        .records
        .get_image(id)?
        .ok_or_else(|| ApiError::NotFound("Image not found".into()))?;
    Ok(Json(record))
}
