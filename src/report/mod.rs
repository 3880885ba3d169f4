//! PDF report rendering.
//!
//! Consumes a finalized `ReportRequest` plus the stored analysis and
//! produces the diagnosis report bytes. Layout: header with patient /
//! doctor / image id, headline diagnosis with confidence, findings and
//! recommendations as bullet lists, clinician explanation at the end.

use std::io::BufWriter;

use printpdf::*;

use crate::models::{AnalysisResult, ReportRequest};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("PDF rendering failed: {0}")]
    Render(String),
}

/// Render the diagnosis report as PDF bytes.
pub fn render_report(
    request: &ReportRequest,
    analysis: &AnalysisResult,
) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) =
        PdfDocument::new("Medical Diagnosis Report", Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Render(format!("font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Render(format!("font error: {e}")))?;

    let mut y = Mm(280.0);

    // Header
    layer.use_text("Medical Diagnosis Report", 16.0, Mm(20.0), y, &bold);
    y -= Mm(10.0);
    layer.use_text(
        format!("Patient: {}", request.patient_name),
        10.0,
        Mm(20.0),
        y,
        &font,
    );
    layer.use_text(
        format!("Image ID: {}", analysis.image_id),
        10.0,
        Mm(110.0),
        y,
        &font,
    );
    y -= Mm(5.0);
    layer.use_text(
        format!("Doctor: {}", request.doctor_name),
        10.0,
        Mm(20.0),
        y,
        &font,
    );
    y -= Mm(5.0);
    if let Some(indication) = &request.clinical_indication {
        layer.use_text(
            format!("Clinical indication: {indication}"),
            10.0,
            Mm(20.0),
            y,
            &font,
        );
        y -= Mm(5.0);
    }
    y -= Mm(6.0);

    // Diagnosis
    layer.use_text("DIAGNOSIS RESULTS:", 12.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    layer.use_text(
        format!("Condition: {}", request.diagnosis),
        10.0,
        Mm(25.0),
        y,
        &font,
    );
    y -= Mm(5.0);
    layer.use_text(
        format!("Confidence: {:.1}%", request.confidence * 100.0),
        10.0,
        Mm(25.0),
        y,
        &font,
    );
    y -= Mm(10.0);

    // Findings
    layer.use_text("DETAILED FINDINGS:", 12.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    for finding in &request.findings {
        for line in wrap_text(&format!("- {finding}"), 85) {
            layer.use_text(&line, 9.0, Mm(25.0), y, &font);
            y -= Mm(4.5);
        }
    }
    y -= Mm(6.0);

    // Recommendations
    layer.use_text("RECOMMENDATIONS:", 12.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    for rec in &request.recommendations {
        for line in wrap_text(&format!("- {rec}"), 85) {
            layer.use_text(&line, 9.0, Mm(25.0), y, &font);
            y -= Mm(4.5);
        }
    }
    y -= Mm(8.0);

    // Clinician explanation
    if !request.medical_explanation.is_empty() {
        layer.use_text("MEDICAL EXPLANATION:", 12.0, Mm(20.0), y, &bold);
        y -= Mm(6.0);
        for line in wrap_text(&request.medical_explanation, 90) {
            layer.use_text(&line, 9.0, Mm(25.0), y, &font);
            y -= Mm(4.5);
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Render(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::Render(format!("buffer error: {e}")))
}

/// Simple word-wrap helper for PDF text rendering.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_request(image_id: Uuid) -> ReportRequest {
        ReportRequest {
            image_id,
            patient_name: "Jane Doe".into(),
            doctor_name: "Dr. Osei".into(),
            clinical_indication: Some("Persistent cough".into()),
            diagnosis: "Pneumonia".into(),
            confidence: 0.9,
            findings: vec!["Right lower lobe consolidation".into()],
            recommendations: vec!["Follow-up radiograph in 6 weeks".into()],
            medical_explanation: "Focal consolidation consistent with infection.".into(),
        }
    }

    fn sample_analysis(image_id: Uuid) -> AnalysisResult {
        AnalysisResult {
            image_id,
            top_diagnosis: "Pneumonia".into(),
            top_confidence: 0.9,
            details: serde_json::json!({"findings": ["consolidation"]}),
            analyzed_at: Utc::now(),
        }
    }

    #[test]
    fn render_produces_pdf_bytes() {
        let id = Uuid::new_v4();
        let bytes = render_report(&sample_request(id), &sample_analysis(id)).unwrap();
        // PDF magic bytes: %PDF
        assert_eq!(&bytes[0..4], b"%PDF");
        assert!(bytes.len() > 500);
    }

    #[test]
    fn render_accepts_empty_lists() {
        let id = Uuid::new_v4();
        let request = ReportRequest {
            findings: vec![],
            recommendations: vec![],
            medical_explanation: String::new(),
            clinical_indication: None,
            ..sample_request(id)
        };
        let bytes = render_report(&request, &sample_analysis(id)).unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn wrap_text_splits_long_lines() {
        let text = "word ".repeat(40);
        let lines = wrap_text(&text, 30);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= 30));
    }

    #[test]
    fn wrap_text_empty_yields_one_line() {
        assert_eq!(wrap_text("", 80), vec![String::new()]);
    }
}
