//! Analysis orchestration: prompt → model call → retry → result.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::models::{AnalysisResult, ImageRecord};

use super::client::VisionModel;
use super::mapper::map_top_diagnosis;
use super::prompt::diagnostic_prompt;
use super::retry::{RetryPolicy, Sleeper};

/// Placeholder shown to patients when analysis could not complete.
const DEGRADED_PATIENT_TEXT: &str = "Error analyzing image.";
/// Placeholder shown to clinicians when analysis could not complete.
const DEGRADED_MEDICAL_TEXT: &str = "Analysis failed.";

/// Drives the vision model with the fixed diagnostic prompt.
///
/// `analyze` never returns an error: transient failures are retried
/// with exponential backoff, and exhaustion (or missing credentials)
/// yields a degraded result carrying an explicit error marker.
pub struct AnalysisService {
    model: Arc<dyn VisionModel>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl AnalysisService {
    pub fn new(model: Arc<dyn VisionModel>, policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            model,
            policy,
            sleeper,
        }
    }

    /// Analyze one ingested image.
    pub async fn analyze(&self, record: &ImageRecord) -> AnalysisResult {
        let start = std::time::Instant::now();

        // No credentials: degrade immediately, no network attempt.
        if !self.model.is_configured() {
            tracing::warn!(image_id = %record.id, "Analysis skipped: GOOGLE_API_KEY not set");
            return degraded_result(record.id, "GOOGLE_API_KEY not set");
        }

        let png_bytes = match tokio::fs::read(&record.stored_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(image_id = %record.id, error = %e, "Cannot read stored image");
                return degraded_result(record.id, &format!("cannot read stored image: {e}"));
            }
        };

        let prompt = diagnostic_prompt(record.metadata.modality.as_str());
        let mut last_error = String::new();

        for attempt in 0..self.policy.max_attempts {
            match self.model.analyze_image(&png_bytes, &prompt).await {
                Ok(details) => {
                    let (top_diagnosis, top_confidence) = map_top_diagnosis(&details);
                    tracing::info!(
                        image_id = %record.id,
                        attempt,
                        top_diagnosis = %top_diagnosis,
                        top_confidence,
                        elapsed_ms = %start.elapsed().as_millis(),
                        "Analysis complete"
                    );
                    return AnalysisResult {
                        image_id: record.id,
                        top_diagnosis,
                        top_confidence,
                        details,
                        analyzed_at: Utc::now(),
                    };
                }
                Err(e) => {
                    last_error = e.to_string();
                    tracing::warn!(image_id = %record.id, attempt, error = %e, "Model call failed");
                    if attempt + 1 < self.policy.max_attempts {
                        self.sleeper.sleep(self.policy.delay_for(attempt)).await;
                    }
                }
            }
        }

        tracing::error!(
            image_id = %record.id,
            attempts = self.policy.max_attempts,
            error = %last_error,
            "Analysis failed after all retries"
        );
        degraded_result(record.id, &last_error)
    }
}

/// Build the well-formed fallback result. The error marker lives in
/// `details["error"]`; every contract key is present so the report
/// renderer always has a complete (if apologetic) input.
fn degraded_result(image_id: Uuid, error: &str) -> AnalysisResult {
    AnalysisResult {
        image_id,
        top_diagnosis: "Unknown".to_string(),
        top_confidence: 0.0,
        details: json!({
            "error": error,
            "findings": [],
            "severity": "UNKNOWN",
            "differential_diagnosis": [],
            "patient_explanation": DEGRADED_PATIENT_TEXT,
            "medical_explanation": DEGRADED_MEDICAL_TEXT,
            "recommendations": [],
            "annotations": []
        }),
        analyzed_at: Utc::now(),
    }
}
