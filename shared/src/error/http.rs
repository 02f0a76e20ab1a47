//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::FoodNotFound
            | Self::CategoryNotFound
            | Self::PrinterNotFound
            | Self::TableNotFound
            | Self::StaffNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::OrderAlreadyPaid
            | Self::OrderNotCompletable
            | Self::OrderCancelled
            | Self::OrderNotCompleted
            | Self::OrderInvalidTransition
            | Self::OrderNotDeletable
            | Self::TableOccupied
            | Self::TableLocked
            | Self::TableReleaseDenied => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::StaffRequired => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::StaffInactive => StatusCode::FORBIDDEN,

            // 503 Service Unavailable (dependency failures, client can retry)
            Self::NetworkError
            | Self::TimeoutError
            | Self::PrinterNotAvailable
            | Self::PrintFailed => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::ClientDisconnected => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::FoodNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::TableNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(ErrorCode::OrderAlreadyPaid.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::OrderInvalidTransition.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ErrorCode::TableLocked.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::TableReleaseDenied.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_validation_status() {
        assert_eq!(ErrorCode::ValidationFailed.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::OrderEmpty.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::OrderInvalidStatus.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::PaymentInsufficientAmount.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::FoodOutOfStock.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_dependency_failure_status() {
        assert_eq!(
            ErrorCode::PrinterNotAvailable.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ErrorCode::TimeoutError.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_internal_status() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
