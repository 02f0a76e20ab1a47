//! Utility module
//!
//! - [`AppError`] / [`ApiResponse`] re-exported from `shared::error`
//! - logging setup
//! - business timezone helpers

pub mod logger;
pub mod time;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
