//! HTTP transport. Thin by design: handlers validate nothing beyond
//! request shape; they call into the pipeline, analysis, and report
//! modules and map errors to status codes.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use types::ApiContext;
