//! The fixed diagnostic prompt contract.
//!
//! Parameterized only by the modality string. The named sections and
//! the exact response keys are load-bearing: the report renderer and
//! the result mapper consume precisely this shape.

/// Build the diagnostic prompt for one analysis call.
pub fn diagnostic_prompt(image_type: &str) -> String {
    format!(
        "You are an expert radiologist. Analyze this {image_type} medical image and provide:\n\
         \n\
         1. FINDINGS: List all abnormalities detected with anatomical locations\n\
         2. SEVERITY: Classify each finding as URGENT, MODERATE, or ROUTINE\n\
         3. DIFFERENTIAL DIAGNOSIS: Top 5 possible conditions with probability estimates (%)\n\
         4. EXPLANATION: Describe findings in both medical terminology AND plain language\n\
         5. RECOMMENDATIONS: Suggest next steps (additional tests, specialist referral, treatment)\n\
         6. ANNOTATIONS: Provide bounding box coordinates [ymin, xmin, ymax, xmax] for abnormalities (normalized 0-1000)\n\
         \n\
         Return response as structured JSON with these exact keys:\n\
         {{\n\
             \"findings\": [...],\n\
             \"severity\": \"URGENT/MODERATE/ROUTINE\",\n\
             \"differential_diagnosis\": [{{condition, probability, reasoning}}],\n\
             \"patient_explanation\": \"...\",\n\
             \"medical_explanation\": \"...\",\n\
             \"recommendations\": [...],\n\
             \"annotations\": [{{label, coordinates, confidence}}]\n\
         }}"
    )
}
