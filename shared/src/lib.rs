//! Shared types for the floor server
//!
//! Domain records (orders, catalog collaborators, table locks, print
//! results) and the unified error model used across crates.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
