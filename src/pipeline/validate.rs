//! Upload policy checks. Pure functions, no side effects.

use crate::config::ProcessingLimits;

use super::ValidationError;

/// Extensions accepted at upload: photo rasters plus DICOM.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "dcm"];

/// Lowercased extension of `filename`, without the dot.
pub fn file_extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Reject uploads outside the accepted extension set or above the byte
/// ceiling. Runs before any decode work.
pub fn validate_upload(
    bytes: &[u8],
    filename: &str,
    limits: &ProcessingLimits,
) -> Result<(), ValidationError> {
    if bytes.len() > limits.max_upload_bytes {
        return Err(ValidationError::PayloadTooLarge {
            size_bytes: bytes.len(),
            limit_bytes: limits.max_upload_bytes,
        });
    }

    let extension = file_extension(filename);
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ValidationError::UnsupportedFormat { extension });
    }

    Ok(())
}

/// Reject decoded images below the resolution floor. Runs after decode,
/// before any pixel work is spent on the image.
pub fn validate_resolution(
    width: u32,
    height: u32,
    limits: &ProcessingLimits,
) -> Result<(), ValidationError> {
    if width < limits.min_resolution || height < limits.min_resolution {
        return Err(ValidationError::ResolutionTooLow {
            width,
            height,
            min: limits.min_resolution,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(file_extension("scan.DCM"), "dcm");
        assert_eq!(file_extension("photo.JPEG"), "jpeg");
    }

    #[test]
    fn extension_missing_is_empty() {
        assert_eq!(file_extension("no_extension"), "");
    }

    #[test]
    fn accepts_all_allowed_extensions() {
        let limits = ProcessingLimits::default();
        for name in ["a.jpg", "b.jpeg", "c.png", "d.dcm", "e.PNG"] {
            assert!(validate_upload(&[0u8; 16], name, &limits).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_unsupported_extension() {
        let limits = ProcessingLimits::default();
        let err = validate_upload(&[0u8; 16], "report.pdf", &limits).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnsupportedFormat { extension } if extension == "pdf"
        ));
    }

    #[test]
    fn rejects_oversized_payload() {
        let limits = ProcessingLimits {
            max_upload_bytes: 8,
            ..ProcessingLimits::default()
        };
        let err = validate_upload(&[0u8; 9], "scan.png", &limits).unwrap_err();
        assert!(matches!(err, ValidationError::PayloadTooLarge { size_bytes: 9, .. }));
    }

    #[test]
    fn size_check_runs_before_extension_check() {
        let limits = ProcessingLimits {
            max_upload_bytes: 8,
            ..ProcessingLimits::default()
        };
        // Both violated; the size ceiling wins
        let err = validate_upload(&[0u8; 9], "file.exe", &limits).unwrap_err();
        assert!(matches!(err, ValidationError::PayloadTooLarge { .. }));
    }

    #[test]
    fn resolution_floor_enforced_per_dimension() {
        let limits = ProcessingLimits::default();
        assert!(validate_resolution(64, 64, &limits).is_ok());
        assert!(validate_resolution(2048, 64, &limits).is_ok());
        assert!(matches!(
            validate_resolution(63, 512, &limits),
            Err(ValidationError::ResolutionTooLow { width: 63, .. })
        ));
        assert!(matches!(
            validate_resolution(512, 1, &limits),
            Err(ValidationError::ResolutionTooLow { height: 1, .. })
        ));
    }
}
