//! HTTP handlers for the metrics endpoint

pub mod endpoint;

// Re-export for convenience
pub use endpoint::{router, serve};
