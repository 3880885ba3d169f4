pub mod analysis;
pub mod image;

pub use analysis::{AnalysisResult, Annotation, DifferentialEntry, ReportRequest, Severity};
pub use image::{ImageMetadata, ImageRecord, Modality, ANONYMIZED_PATIENT_ID, NORMALIZED_FORMAT};
