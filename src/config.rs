use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Radiolens";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> String {
    "info,radiolens=debug".to_string()
}

/// Get the application data directory.
/// `~/Radiolens/` unless overridden with `RADIOLENS_DATA_DIR`.
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("RADIOLENS_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Radiolens")
}

/// Get the processed-image store directory
pub fn uploads_dir() -> PathBuf {
    app_data_dir().join("uploads")
}

/// Get the generated-report directory
pub fn reports_dir() -> PathBuf {
    app_data_dir().join("reports")
}

/// Socket address the HTTP server binds to.
/// Overridable with `RADIOLENS_ADDR`.
pub fn server_addr() -> String {
    std::env::var("RADIOLENS_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string())
}

/// Gemini API key, read from the environment at call time.
/// `None` routes analysis straight to the degraded-result path.
pub fn google_api_key() -> Option<String> {
    std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty())
}

/// Numeric policy knobs for image ingestion.
///
/// Defaults match the enforced production behavior. `min_resolution` is a
/// field rather than a constant so deployments can tighten the floor
/// without a code change.
#[derive(Debug, Clone)]
pub struct ProcessingLimits {
    /// Upload ceiling in bytes.
    pub max_upload_bytes: usize,
    /// Minimum width and height after decode.
    pub min_resolution: u32,
    /// Largest dimension kept after normalization; bigger images are
    /// downscaled to fit.
    pub max_dimension: u32,
    /// Bounding box for generated thumbnails.
    pub thumbnail_size: u32,
    /// Multiplicative contrast factor. Kept mild so diagnostic signal
    /// survives the adjustment.
    pub contrast_factor: f32,
}

impl Default for ProcessingLimits {
    fn default() -> Self {
        Self {
            max_upload_bytes: 25 * 1024 * 1024,
            min_resolution: 64,
            max_dimension: 2048,
            thumbnail_size: 256,
            contrast_factor: 1.2,
        }
    }
}
