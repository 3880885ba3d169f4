use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Overall urgency assigned by the model to the study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Urgent,
    Moderate,
    Routine,
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "URGENT",
            Self::Moderate => "MODERATE",
            Self::Routine => "ROUTINE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

// ---------------------------------------------------------------------------
// AnalysisResult
// ---------------------------------------------------------------------------

/// Stable internal result of one analysis call.
///
/// `details` carries the model's full structured output (findings,
/// severity, differential list, explanations, recommendations,
/// annotations) as a raw document; `top_diagnosis`/`top_confidence` are
/// the extracted headline. References the image by id only; the record
/// may have been evicted by the time a reader looks it up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub image_id: Uuid,
    pub top_diagnosis: String,
    /// Always within [0, 1]; malformed upstream values map to 0.0.
    pub top_confidence: f64,
    pub details: serde_json::Value,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// True when this result came from the degraded fallback path
    /// rather than a successful model call.
    pub fn is_degraded(&self) -> bool {
        self.details.get("error").is_some()
    }
}

/// One candidate condition in the model's ranked differential list.
///
/// `probability` is left as a raw value: the model emits percentage
/// strings ("90%"), bare percentages (90) and fractions (0.9)
/// interchangeably. Normalization happens at extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifferentialEntry {
    pub condition: String,
    pub probability: serde_json::Value,
    pub reasoning: String,
}

/// A labelled bounding box marking a region of interest.
/// Coordinates are `[ymin, xmin, ymax, xmax]`, normalized to 0-1000.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub label: String,
    pub coordinates: [f64; 4],
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// ReportRequest
// ---------------------------------------------------------------------------

/// Input for PDF report generation, assembled by the client from the
/// analysis it already fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub image_id: Uuid,
    pub patient_name: String,
    pub doctor_name: String,
    pub clinical_indication: Option<String>,
    pub diagnosis: String,
    pub confidence: f64,
    pub findings: Vec<String>,
    pub recommendations: Vec<String>,
    pub medical_explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Severity::Urgent).unwrap(), "\"URGENT\"");
        assert_eq!(serde_json::to_string(&Severity::Unknown).unwrap(), "\"UNKNOWN\"");
    }

    #[test]
    fn degraded_marker_detected() {
        let ok = AnalysisResult {
            image_id: Uuid::new_v4(),
            top_diagnosis: "Pneumonia".into(),
            top_confidence: 0.9,
            details: serde_json::json!({"findings": ["opacity"]}),
            analyzed_at: Utc::now(),
        };
        assert!(!ok.is_degraded());

        let degraded = AnalysisResult {
            details: serde_json::json!({"error": "timeout"}),
            ..ok
        };
        assert!(degraded.is_degraded());
    }

    #[test]
    fn differential_entry_accepts_heterogeneous_probability() {
        let from_string: DifferentialEntry = serde_json::from_value(serde_json::json!({
            "condition": "Pneumonia",
            "probability": "90%",
            "reasoning": "consolidation in right lower lobe"
        }))
        .unwrap();
        assert_eq!(from_string.probability, serde_json::json!("90%"));

        let from_number: DifferentialEntry = serde_json::from_value(serde_json::json!({
            "condition": "Pneumonia",
            "probability": 0.9,
            "reasoning": "consolidation in right lower lobe"
        }))
        .unwrap();
        assert_eq!(from_number.probability, serde_json::json!(0.9));
    }
}
