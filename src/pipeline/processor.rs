//! Pipeline orchestration: bytes in, `ImageRecord` out.

use std::sync::Arc;

use image::GenericImageView;
use uuid::Uuid;

use crate::config::ProcessingLimits;
use crate::models::{ImageMetadata, ImageRecord, NORMALIZED_FORMAT};
use crate::store::{ArtifactStore, RecordStore};

use super::{decode, normalize, validate, PipelineError};

/// Orchestrates validate → decode → normalize → persist.
///
/// Holds no per-request state; one instance is shared by all concurrent
/// requests.
pub struct ImagePipeline {
    limits: ProcessingLimits,
    artifacts: ArtifactStore,
    records: Arc<dyn RecordStore>,
}

impl ImagePipeline {
    pub fn new(
        limits: ProcessingLimits,
        artifacts: ArtifactStore,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            limits,
            artifacts,
            records,
        }
    }

    pub fn limits(&self) -> &ProcessingLimits {
        &self.limits
    }

    /// Run the full ingestion pipeline on one upload.
    ///
    /// Side effects on success: the normalized raster and its thumbnail
    /// are written under a freshly generated id, and the record is put
    /// in the record store. On failure nothing is recorded; callers
    /// must not assume any artifact exists.
    pub fn process(&self, bytes: &[u8], filename: &str) -> Result<ImageRecord, PipelineError> {
        let start = std::time::Instant::now();
        tracing::info!(file = %filename, size_bytes = bytes.len(), "Starting image ingestion");

        // Step 1: upload policy (extension set, byte ceiling)
        validate::validate_upload(bytes, filename, &self.limits)?;
        let extension = validate::file_extension(filename);

        // Step 2: decode (raster codecs or DICOM)
        let (img, source) = decode::decode(bytes, &extension)?;

        // Step 3: resolution floor on the decoded image
        validate::validate_resolution(img.width(), img.height(), &self.limits)?;

        // Step 4: mild contrast enhancement
        let img = normalize::enhance_contrast(&img, self.limits.contrast_factor);

        // Step 5: bound the stored raster to the dimension ceiling
        let img = normalize::downscale_if_oversized(&img, self.limits.max_dimension);

        // Step 6: persist the normalized raster under a fresh id
        let id = Uuid::new_v4();
        let stored_path = self.artifacts.image_path(id);
        self.artifacts.save_png(&img, &stored_path)?;

        // Step 7: generate and persist the thumbnail
        let thumb = normalize::thumbnail(&img, self.limits.thumbnail_size);
        let thumbnail_path = self.artifacts.thumbnail_path(id);
        self.artifacts.save_png(&thumb, &thumbnail_path)?;

        // Step 8: assemble metadata and record the result
        let record = ImageRecord {
            id,
            stored_path,
            thumbnail_path,
            metadata: ImageMetadata {
                modality: source.modality,
                body_part: source.body_part,
                patient_id: source.patient_id,
                width: img.width(),
                height: img.height(),
                format: NORMALIZED_FORMAT.to_string(),
            },
        };
        self.records.put_image(record.clone())?;

        tracing::info!(
            image_id = %id,
            modality = source.modality.as_str(),
            width = record.metadata.width,
            height = record.metadata.height,
            elapsed_ms = %start.elapsed().as_millis(),
            "Image ingested"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Modality;
    use crate::store::InMemoryRecordStore;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::io::Cursor;

    fn make_png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([80, 120, 160])));
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, image::ImageFormat::Png).unwrap();
        cursor.into_inner()
    }

    fn setup() -> (tempfile::TempDir, ImagePipeline, Arc<InMemoryRecordStore>) {
        let tmp = tempfile::tempdir().unwrap();
        let artifacts = ArtifactStore::open(tmp.path().join("uploads")).unwrap();
        let records = Arc::new(InMemoryRecordStore::new());
        let pipeline = ImagePipeline::new(ProcessingLimits::default(), artifacts, records.clone());
        (tmp, pipeline, records)
    }

    #[test]
    fn process_writes_both_artifacts() {
        let (_tmp, pipeline, _) = setup();
        let record = pipeline.process(&make_png(320, 240), "photo.png").unwrap();

        assert!(record.stored_path.is_file());
        assert!(record.thumbnail_path.is_file());
        assert!(record
            .stored_path
            .ends_with(format!("{}.png", record.id)));
        assert!(record
            .thumbnail_path
            .ends_with(format!("thumbnails/{}_thumb.png", record.id)));
    }

    #[test]
    fn process_normalizes_metadata() {
        let (_tmp, pipeline, _) = setup();
        let record = pipeline.process(&make_png(320, 240), "photo.jpg").unwrap();

        assert_eq!(record.metadata.modality, Modality::Photo);
        assert_eq!(record.metadata.format, "PNG");
        assert_eq!(record.metadata.width, 320);
        assert_eq!(record.metadata.height, 240);
        assert!(record.metadata.patient_id.is_none());
    }

    #[test]
    fn dimensions_bounded_after_processing() {
        let (_tmp, pipeline, _) = setup();
        let limits = pipeline.limits().clone();
        let record = pipeline.process(&make_png(4096, 1024), "big.png").unwrap();

        assert!(record.metadata.width <= limits.max_dimension);
        assert!(record.metadata.height <= limits.max_dimension);
        assert!(record.metadata.width >= limits.min_resolution);
        // Aspect preserved: 4096x1024 → 2048x512
        assert_eq!(record.metadata.width, 2048);
        assert_eq!(record.metadata.height, 512);
    }

    #[test]
    fn oversized_payload_rejected_with_no_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = tmp.path().join("uploads");
        let artifacts = ArtifactStore::open(&uploads).unwrap();
        let limits = ProcessingLimits {
            max_upload_bytes: 64,
            ..ProcessingLimits::default()
        };
        let pipeline = ImagePipeline::new(limits, artifacts, Arc::new(InMemoryRecordStore::new()));

        let err = pipeline.process(&make_png(128, 128), "big.png").unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));

        // Nothing written besides the (empty) layout
        let files: Vec<_> = std::fs::read_dir(&uploads)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .collect();
        assert!(files.is_empty());
    }

    #[test]
    fn low_resolution_rejected() {
        let (_tmp, pipeline, _) = setup();
        let err = pipeline.process(&make_png(32, 32), "tiny.png").unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[test]
    fn unsupported_extension_rejected_before_decode() {
        let (_tmp, pipeline, _) = setup();
        let err = pipeline.process(&make_png(128, 128), "scan.tiff").unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[test]
    fn corrupt_payload_is_a_decode_error() {
        let (_tmp, pipeline, _) = setup();
        let garbage = [0x00u8, 0x01, 0x02, 0x03].repeat(64);
        let err = pipeline.process(&garbage, "broken.jpg").unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
    }

    #[test]
    fn processed_record_round_trips_through_store() {
        let (_tmp, pipeline, records) = setup();
        let record = pipeline.process(&make_png(320, 240), "photo.png").unwrap();

        let fetched = records.get_image(record.id).unwrap().unwrap();
        assert_eq!(fetched.id, record.id);
        assert_eq!(fetched.stored_path, record.stored_path);
        assert_eq!(fetched.metadata.width, record.metadata.width);
        assert_eq!(fetched.metadata.height, record.metadata.height);
        assert_eq!(fetched.metadata.format, record.metadata.format);
    }

    #[test]
    fn each_upload_gets_a_fresh_id() {
        let (_tmp, pipeline, _) = setup();
        let png = make_png(128, 128);
        let a = pipeline.process(&png, "one.png").unwrap();
        let b = pipeline.process(&png, "one.png").unwrap();
        assert_ne!(a.id, b.id);
    }
}
