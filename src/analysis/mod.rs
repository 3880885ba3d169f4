//! AI analysis: prompt contract, vision backend seam, retry policy,
//! and result shaping.
//!
//! `AnalysisService::analyze` never errors; exhausted retries and
//! missing credentials resolve to a well-formed degraded result that
//! downstream report generation can always consume.

pub mod client;
pub mod mapper;
pub mod prompt;
pub mod retry;
pub mod service;

pub use client::{GeminiClient, ModelError, VisionModel};
pub use mapper::map_top_diagnosis;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use service::AnalysisService;
