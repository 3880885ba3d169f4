use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use super::{RecordStore, StoreError};
use crate::models::{AnalysisResult, ImageRecord};

/// In-memory record store.
///
/// `RwLock` allows concurrent readers; writes happen once per key. Lock
/// poisoning is surfaced as `StoreError` rather than a panic so the
/// transport can answer with a 5xx.
#[derive(Default)]
pub struct InMemoryRecordStore {
    images: RwLock<HashMap<Uuid, ImageRecord>>,
    analyses: RwLock<HashMap<Uuid, AnalysisResult>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn put_image(&self, record: ImageRecord) -> Result<(), StoreError> {
        let mut images = self.images.write().map_err(|_| StoreError::LockPoisoned)?;
        images.insert(record.id, record);
        Ok(())
    }

    fn get_image(&self, id: Uuid) -> Result<Option<ImageRecord>, StoreError> {
        let images = self.images.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(images.get(&id).cloned())
    }

    fn put_analysis(&self, result: AnalysisResult) -> Result<(), StoreError> {
        let mut analyses = self.analyses.write().map_err(|_| StoreError::LockPoisoned)?;
        analyses.insert(result.image_id, result);
        Ok(())
    }

    fn get_analysis(&self, image_id: Uuid) -> Result<Option<AnalysisResult>, StoreError> {
        let analyses = self.analyses.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(analyses.get(&image_id).cloned())
    }
}
