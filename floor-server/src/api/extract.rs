//! Request extractors

use axum::extract::FromRequestParts;
use http::request::Parts;

use crate::utils::{AppError, ErrorCode};

/// Header naming the acting staff member; authentication happens upstream
pub const STAFF_ID_HEADER: &str = "x-staff-id";

/// Acting staff member id from `X-Staff-Id`
///
/// Missing or blank header is rejected with `StaffRequired`. Whether the id
/// exists and is active is checked by the order ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffId(pub String);

impl<S> FromRequestParts<S> for StaffId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(STAFF_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| StaffId(v.to_string()))
            .ok_or_else(|| AppError::new(ErrorCode::StaffRequired))
    }
}
