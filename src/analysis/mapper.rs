//! Extraction of the headline diagnosis from the model's raw output.
//!
//! The differential list arrives with heterogeneous probability
//! encodings ("90%", 90, 0.9). This function normalizes them into one
//! [0, 1] float and never fails; malformed input degrades to
//! ("Unknown", 0.0).

/// Extract (top diagnosis, confidence) from the raw details document.
///
/// Takes the first entry of `differential_diagnosis` (the list is
/// ranked). Probability handling: strip a trailing `%`, parse as float,
/// treat values above 1 as percentages, clamp the result into [0, 1].
pub fn map_top_diagnosis(details: &serde_json::Value) -> (String, f64) {
    let first = match details
        .get("differential_diagnosis")
        .and_then(|d| d.as_array())
        .and_then(|list| list.first())
    {
        Some(entry) => entry,
        None => return ("Unknown".to_string(), 0.0),
    };

    let condition = first
        .get("condition")
        .and_then(|c| c.as_str())
        .unwrap_or("Unknown")
        .to_string();

    let confidence = first
        .get("probability")
        .map(normalize_probability)
        .unwrap_or(0.0);

    (condition, confidence)
}

/// Normalize one probability value into [0, 1]. Parse failures map
/// to 0.0.
fn normalize_probability(raw: &serde_json::Value) -> f64 {
    let parsed = match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(value) if value.is_finite() => {
            let fraction = if value > 1.0 { value / 100.0 } else { value };
            fraction.clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn details_with_probability(probability: serde_json::Value) -> serde_json::Value {
        json!({
            "differential_diagnosis": [
                {
                    "condition": "Pneumonia",
                    "probability": probability,
                    "reasoning": "right lower lobe consolidation"
                },
                {
                    "condition": "Atelectasis",
                    "probability": "40%",
                    "reasoning": "volume loss"
                }
            ]
        })
    }

    #[test]
    fn percentage_string_normalized() {
        let (diagnosis, confidence) = map_top_diagnosis(&details_with_probability(json!("90%")));
        assert_eq!(diagnosis, "Pneumonia");
        assert!((confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn bare_percentage_number_normalized() {
        let (_, confidence) = map_top_diagnosis(&details_with_probability(json!(90)));
        assert!((confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn fraction_passes_through() {
        let (_, confidence) = map_top_diagnosis(&details_with_probability(json!(0.9)));
        assert!((confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn first_entry_wins() {
        let (diagnosis, _) = map_top_diagnosis(&details_with_probability(json!("85%")));
        assert_eq!(diagnosis, "Pneumonia");
    }

    #[test]
    fn empty_list_degrades() {
        let details = json!({"differential_diagnosis": []});
        assert_eq!(map_top_diagnosis(&details), ("Unknown".to_string(), 0.0));
    }

    #[test]
    fn absent_list_degrades() {
        let details = json!({"findings": ["opacity"]});
        assert_eq!(map_top_diagnosis(&details), ("Unknown".to_string(), 0.0));
    }

    #[test]
    fn missing_condition_defaults_to_unknown() {
        let details = json!({
            "differential_diagnosis": [{"probability": "75%", "reasoning": "x"}]
        });
        let (diagnosis, confidence) = map_top_diagnosis(&details);
        assert_eq!(diagnosis, "Unknown");
        assert!((confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn garbage_probability_maps_to_zero() {
        for garbage in [json!("high"), json!(null), json!({"p": 1}), json!("")] {
            let (_, confidence) = map_top_diagnosis(&details_with_probability(garbage.clone()));
            assert_eq!(confidence, 0.0, "for {garbage}");
        }
    }

    #[test]
    fn overrange_percentage_clamped_to_one() {
        let (_, confidence) = map_top_diagnosis(&details_with_probability(json!(150)));
        assert_eq!(confidence, 1.0);
    }

    #[test]
    fn negative_probability_clamped_to_zero() {
        let (_, confidence) = map_top_diagnosis(&details_with_probability(json!(-0.5)));
        assert_eq!(confidence, 0.0);
    }

    #[test]
    fn whitespace_around_percentage_tolerated() {
        let (_, confidence) = map_top_diagnosis(&details_with_probability(json!(" 90 % ")));
        // "90 %" with inner space: trailing % stripped, inner content trimmed
        assert!((confidence - 0.9).abs() < 1e-9);
    }
}
