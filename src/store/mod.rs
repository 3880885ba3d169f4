//! Record and artifact persistence.
//!
//! Records live behind the `RecordStore` trait so the in-memory
//! implementation can be swapped for a durable store without touching
//! the pipeline or the transport. Artifacts (normalized rasters and
//! thumbnails) are plain files on an id-addressed layout.

pub mod artifacts;
pub mod memory;

use uuid::Uuid;

use crate::models::{AnalysisResult, ImageRecord};

pub use artifacts::{ArtifactStore, StorageError};
pub use memory::InMemoryRecordStore;

/// Errors from the record store itself (not "key absent"; lookups
/// return `None` for that).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record store lock poisoned")]
    LockPoisoned,
}

/// Keyed storage for image records and analysis results.
///
/// Each key is written exactly once, by the request that generated the
/// id; readers may observe `None` for ids they did not create.
pub trait RecordStore: Send + Sync {
    fn put_image(&self, record: ImageRecord) -> Result<(), StoreError>;
    fn get_image(&self, id: Uuid) -> Result<Option<ImageRecord>, StoreError>;
    fn put_analysis(&self, result: AnalysisResult) -> Result<(), StoreError>;
    fn get_analysis(&self, image_id: Uuid) -> Result<Option<AnalysisResult>, StoreError>;
}
