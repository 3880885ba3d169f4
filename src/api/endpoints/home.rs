//! `GET /`: service banner.

use axum::Json;
use serde::Serialize;

use crate::config;

#[derive(Serialize)]
pub struct BannerResponse {
    pub message: &'static str,
    pub version: &'static str,
}

pub async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "Medical Imaging Platform API",
        version: config::APP_VERSION,
    })
}
