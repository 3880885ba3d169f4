//! Image ingestion pipeline.
//!
//! validate → decode → validate-resolution → normalize → persist.
//! Every stage is a hard gate: the first failure aborts the run and no
//! record is stored. Callers must not assume artifacts exist unless
//! `process` returned `Ok`.

pub mod decode;
pub mod dicom;
pub mod normalize;
pub mod processor;
pub mod validate;

pub use decode::SourceMetadata;
pub use processor::ImagePipeline;

use crate::store::{StorageError, StoreError};

/// Upload rejected by policy before or just after decode.
/// User-correctable; the transport maps these to 4xx.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },
    #[error("File size exceeds limit of {limit_bytes} bytes (got {size_bytes})")]
    PayloadTooLarge { size_bytes: usize, limit_bytes: usize },
    #[error("Image resolution too low: {width}x{height}, minimum {min}x{min}")]
    ResolutionTooLow { width: u32, height: u32, min: u32 },
}

/// Corrupt or unparseable payload. Decoding never returns a partial
/// image: either the full raster decodes or this error comes back.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Invalid image file: {0}")]
    Raster(#[from] image::ImageError),
    #[error("Failed to process DICOM: {0}")]
    Dicom(String),
}

/// Any failure during `ImagePipeline::process`.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
