use std::path::PathBuf;
use std::sync::Arc;

use crate::analysis::AnalysisService;
use crate::pipeline::ImagePipeline;
use crate::store::RecordStore;

/// Shared state handed to every handler.
///
/// Everything inside is either immutable or internally synchronized,
/// so the context is cheap to clone per request.
#[derive(Clone)]
pub struct ApiContext {
    pub pipeline: Arc<ImagePipeline>,
    pub records: Arc<dyn RecordStore>,
    pub analysis: Arc<AnalysisService>,
    pub reports_dir: PathBuf,
}

impl ApiContext {
    pub fn new(
        pipeline: Arc<ImagePipeline>,
        records: Arc<dyn RecordStore>,
        analysis: Arc<AnalysisService>,
        reports_dir: PathBuf,
    ) -> Self {
        Self {
            pipeline,
            records,
            analysis,
            reports_dir,
        }
    }
}
