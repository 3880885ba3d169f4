use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder written to every DICOM record in place of the embedded
/// patient identifier. Real identifiers never leave the decoder.
pub const ANONYMIZED_PATIENT_ID: &str = "ANONYMIZED";

/// All persisted rasters are re-encoded to this format on ingestion,
/// regardless of what the upload contained.
pub const NORMALIZED_FORMAT: &str = "PNG";

// ---------------------------------------------------------------------------
// Modality
// ---------------------------------------------------------------------------

/// The imaging technique that produced the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modality {
    #[serde(rename = "CT")]
    Ct,
    #[serde(rename = "MR")]
    Mr,
    #[serde(rename = "XR")]
    Xr,
    #[serde(rename = "US")]
    Us,
    Unknown,
    Photo,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ct => "CT",
            Self::Mr => "MR",
            Self::Xr => "XR",
            Self::Us => "US",
            Self::Unknown => "Unknown",
            Self::Photo => "Photo",
        }
    }

    /// Map a DICOM modality code (0008,0060) onto the supported set.
    /// The projection-radiography family (CR, DX, RG) collapses to XR.
    pub fn from_dicom_code(code: &str) -> Self {
        match code.trim() {
            "CT" => Self::Ct,
            "MR" => Self::Mr,
            "XR" | "CR" | "DX" | "RG" => Self::Xr,
            "US" => Self::Us,
            _ => Self::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// ImageMetadata / ImageRecord
// ---------------------------------------------------------------------------

/// Metadata assembled at ingestion. `width`/`height` describe the
/// normalized raster, not the upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub modality: Modality,
    pub body_part: Option<String>,
    /// `ANONYMIZED` for DICOM input, `None` for photos. Never a real
    /// identifier.
    pub patient_id: Option<String>,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

/// One successfully ingested image. Created once per `process` call and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: Uuid,
    pub stored_path: PathBuf,
    pub thumbnail_path: PathBuf,
    pub metadata: ImageMetadata,
}
