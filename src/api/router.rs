//! Router assembly.
//!
//! Returns a composable `Router` with the imaging endpoints under
//! `/api/`. CORS is allow-all, which is the development posture;
//! restrict at the deployment boundary.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Body ceiling for the whole request. Slightly above the 25 MiB
/// upload limit so multipart framing does not count against the
/// payload itself; the validator enforces the exact per-file ceiling.
const MAX_BODY_BYTES: usize = 26 * 1024 * 1024;

/// Build the API router.
pub fn api_router(ctx: ApiContext) -> Router {
    let api = Router::new()
        .route("/upload-image", post(endpoints::images::upload))
        .route("/images/:id", get(endpoints::images::detail))
        .route("/analyze-image", post(endpoints::diagnosis::analyze))
        .route("/diagnosis/:id", get(endpoints::diagnosis::detail))
        .route("/generate-report", post(endpoints::reports::generate))
        .with_state(ctx);

    Router::new()
        .route("/", get(endpoints::home::banner))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
}
