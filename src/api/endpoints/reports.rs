//! `POST /api/generate-report`: render the diagnosis PDF.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::ReportRequest;
use crate::report::render_report;

#[derive(Serialize)]
pub struct ReportResponse {
    pub report_url: String,
    pub report_id: Uuid,
}

/// Render the report for an analyzed image and persist it under the
/// reports directory. Returns the URL path of the written PDF.
pub async fn generate(
    State(ctx): State<ApiContext>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    let analysis = ctx
        .records
        .get_analysis(request.image_id)?
        .ok_or_else(|| ApiError::NotFound("Diagnosis not found for report generation".into()))?;

    let pdf_bytes = render_report(&request, &analysis)?;

    let filename = format!("report_{}.pdf", request.image_id);
    let path = ctx.reports_dir.join(&filename);
    tokio::fs::write(&path, &pdf_bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("Cannot write report: {e}")))?;

    tracing::info!(
        image_id = %request.image_id,
        path = %path.display(),
        size_bytes = pdf_bytes.len(),
        "Report generated"
    );

    Ok(Json(ReportResponse {
        report_url: format!("/reports/{filename}"),
        report_id: request.image_id,
    }))
}
