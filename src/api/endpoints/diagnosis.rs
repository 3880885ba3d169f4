//! Analysis endpoints.
//!
//! `POST /api/analyze-image`: run AI analysis on an ingested image.
//! `GET /api/diagnosis/:id`: fetch a stored analysis result.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::AnalysisResult;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub image_id: Uuid,
}

/// `POST /api/analyze-image`: analyze a previously uploaded image.
///
/// Always answers 200 with a well-formed result once the image record
/// exists: analysis failures surface as a degraded result with an
/// `error` marker in the details, never as a 5xx.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let record = ctx
        .records
        .get_image(request.image_id)?
        .ok_or_else(|| ApiError::NotFound("Image not found".into()))?;

    let result = ctx.analysis.analyze(&record).await;
    ctx.records.put_analysis(result.clone())?;

    Ok(Json(result))
}

/// `GET /api/diagnosis/:id`: fetch the stored analysis for an image.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let result = ctx
        .records
        .get_analysis(id)?
        .ok_or_else(|| ApiError::NotFound("Diagnosis not found".into()))?;
    Ok(Json(result))
}
