pub mod analysis;
pub mod api;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::analysis::VisionModel;

/// Wire up the application and serve the API until shutdown.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Radiolens starting v{}", config::APP_VERSION);

    let reports_dir = config::reports_dir();
    std::fs::create_dir_all(&reports_dir)?;

    let artifacts = store::ArtifactStore::open(config::uploads_dir())?;
    let records: Arc<dyn store::RecordStore> = Arc::new(store::InMemoryRecordStore::new());
    let pipeline = Arc::new(pipeline::ImagePipeline::new(
        config::ProcessingLimits::default(),
        artifacts,
        records.clone(),
    ));

    let model = Arc::new(analysis::GeminiClient::from_env());
    if !model.is_configured() {
        tracing::warn!("GOOGLE_API_KEY not set; analysis will return degraded results");
    }
    let analysis_service = Arc::new(analysis::AnalysisService::new(
        model,
        analysis::RetryPolicy::default(),
        Arc::new(analysis::TokioSleeper),
    ));

    let ctx = api::ApiContext::new(pipeline, records, analysis_service, reports_dir);
    let app = api::api_router(ctx);

    let addr = config::server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Radiolens API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
