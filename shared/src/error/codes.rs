//! Unified error codes for the floor server
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog errors (food, category, printer)
//! - 7xxx: Table errors
//! - 8xxx: Staff errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a bare `u16` so waiter tablets and the cashier screen can
/// switch on it without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Order is not in a state that allows completion
    OrderNotCompletable = 4003,
    /// Order has been cancelled
    OrderCancelled = 4004,
    /// Order is not completed yet (payment requires completion)
    OrderNotCompleted = 4005,
    /// Order is empty
    OrderEmpty = 4007,
    /// Unknown order status value
    OrderInvalidStatus = 4008,
    /// Status transition not allowed from the current status
    OrderInvalidTransition = 4009,
    /// Order is in a financial state and cannot be deleted
    OrderNotDeletable = 4010,
    /// Invalid item quantity
    OrderInvalidQuantity = 4011,

    // ==================== 5xxx: Payment ====================
    /// Payment processing failed
    PaymentFailed = 5001,
    /// Insufficient payment amount
    PaymentInsufficientAmount = 5002,
    /// Invalid payment method
    PaymentInvalidMethod = 5003,
    /// Amount does not match the order total
    PaymentAmountMismatch = 5006,
    /// Amount must be positive (or non-negative for mixed legs)
    PaymentInvalidAmount = 5007,
    /// Mixed legs do not add up to the declared total
    PaymentSplitMismatch = 5008,

    // ==================== 6xxx: Catalog ====================
    /// Food not found
    FoodNotFound = 6001,
    /// Food is not active
    FoodInactive = 6002,
    /// Not enough stock
    FoodOutOfStock = 6003,
    /// Food is past its expiration date
    FoodExpired = 6004,
    /// Category not found
    CategoryNotFound = 6101,
    /// Printer not found
    PrinterNotFound = 6501,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is occupied
    TableOccupied = 7002,
    /// Table is reserved by another holder
    TableLocked = 7003,
    /// Lock release requested by someone who does not hold it
    TableReleaseDenied = 7004,

    // ==================== 8xxx: Staff ====================
    /// Staff member not found
    StaffNotFound = 8001,
    /// Staff member is deactivated
    StaffInactive = 8002,
    /// Acting staff member missing from the request
    StaffRequired = 8003,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Printer is not reachable
    PrinterNotAvailable = 9201,
    /// Print job failed
    PrintFailed = 9202,
    /// Client disconnected
    ClientDisconnected = 9301,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderNotCompletable => "Order cannot be completed",
            ErrorCode::OrderCancelled => "Order has been cancelled",
            ErrorCode::OrderNotCompleted => "Order is not completed",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::OrderInvalidStatus => "Invalid order status",
            ErrorCode::OrderInvalidTransition => "Status transition not allowed",
            ErrorCode::OrderNotDeletable => "Order cannot be deleted",
            ErrorCode::OrderInvalidQuantity => "Invalid item quantity",

            // Payment
            ErrorCode::PaymentFailed => "Payment processing failed",
            ErrorCode::PaymentInsufficientAmount => "Insufficient payment amount",
            ErrorCode::PaymentInvalidMethod => "Invalid payment method",
            ErrorCode::PaymentAmountMismatch => "Payment amount does not match order total",
            ErrorCode::PaymentInvalidAmount => "Invalid payment amount",
            ErrorCode::PaymentSplitMismatch => "Cash and card do not add up to the total",

            // Catalog
            ErrorCode::FoodNotFound => "Food not found",
            ErrorCode::FoodInactive => "Food is not available",
            ErrorCode::FoodOutOfStock => "Not enough stock",
            ErrorCode::FoodExpired => "Food has expired",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::PrinterNotFound => "Printer not found",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableOccupied => "Table is occupied",
            ErrorCode::TableLocked => "Table is reserved by another user",
            ErrorCode::TableReleaseDenied => "Table is not reserved by this user",

            // Staff
            ErrorCode::StaffNotFound => "Staff member not found",
            ErrorCode::StaffInactive => "Staff member is inactive",
            ErrorCode::StaffRequired => "Acting staff member is required",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::PrinterNotAvailable => "Printer is not available",
            ErrorCode::PrintFailed => "Print operation failed",
            ErrorCode::ClientDisconnected => "Client disconnected",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Returned when a numeric value does not name any [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4003 => Ok(ErrorCode::OrderNotCompletable),
            4004 => Ok(ErrorCode::OrderCancelled),
            4005 => Ok(ErrorCode::OrderNotCompleted),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::OrderInvalidStatus),
            4009 => Ok(ErrorCode::OrderInvalidTransition),
            4010 => Ok(ErrorCode::OrderNotDeletable),
            4011 => Ok(ErrorCode::OrderInvalidQuantity),

            5001 => Ok(ErrorCode::PaymentFailed),
            5002 => Ok(ErrorCode::PaymentInsufficientAmount),
            5003 => Ok(ErrorCode::PaymentInvalidMethod),
            5006 => Ok(ErrorCode::PaymentAmountMismatch),
            5007 => Ok(ErrorCode::PaymentInvalidAmount),
            5008 => Ok(ErrorCode::PaymentSplitMismatch),

            6001 => Ok(ErrorCode::FoodNotFound),
            6002 => Ok(ErrorCode::FoodInactive),
            6003 => Ok(ErrorCode::FoodOutOfStock),
            6004 => Ok(ErrorCode::FoodExpired),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6501 => Ok(ErrorCode::PrinterNotFound),

            7001 => Ok(ErrorCode::TableNotFound),
            7002 => Ok(ErrorCode::TableOccupied),
            7003 => Ok(ErrorCode::TableLocked),
            7004 => Ok(ErrorCode::TableReleaseDenied),

            8001 => Ok(ErrorCode::StaffNotFound),
            8002 => Ok(ErrorCode::StaffInactive),
            8003 => Ok(ErrorCode::StaffRequired),

            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9201 => Ok(ErrorCode::PrinterNotAvailable),
            9202 => Ok(ErrorCode::PrintFailed),
            9301 => Ok(ErrorCode::ClientDisconnected),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::OrderInvalidTransition.code(), 4009);
        assert_eq!(ErrorCode::PaymentInsufficientAmount.code(), 5002);
        assert_eq!(ErrorCode::FoodOutOfStock.code(), 6003);
        assert_eq!(ErrorCode::TableLocked.code(), 7003);
        assert_eq!(ErrorCode::StaffNotFound.code(), 8001);
        assert_eq!(ErrorCode::PrintFailed.code(), 9202);
    }

    #[test]
    fn test_try_from_covers_every_variant() {
        let all = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::InvalidRequest,
            ErrorCode::RequiredField,
            ErrorCode::ValueOutOfRange,
            ErrorCode::OrderNotFound,
            ErrorCode::OrderAlreadyPaid,
            ErrorCode::OrderNotCompletable,
            ErrorCode::OrderCancelled,
            ErrorCode::OrderNotCompleted,
            ErrorCode::OrderEmpty,
            ErrorCode::OrderInvalidStatus,
            ErrorCode::OrderInvalidTransition,
            ErrorCode::OrderNotDeletable,
            ErrorCode::OrderInvalidQuantity,
            ErrorCode::PaymentFailed,
            ErrorCode::PaymentInsufficientAmount,
            ErrorCode::PaymentInvalidMethod,
            ErrorCode::PaymentAmountMismatch,
            ErrorCode::PaymentInvalidAmount,
            ErrorCode::PaymentSplitMismatch,
            ErrorCode::FoodNotFound,
            ErrorCode::FoodInactive,
            ErrorCode::FoodOutOfStock,
            ErrorCode::FoodExpired,
            ErrorCode::CategoryNotFound,
            ErrorCode::PrinterNotFound,
            ErrorCode::TableNotFound,
            ErrorCode::TableOccupied,
            ErrorCode::TableLocked,
            ErrorCode::TableReleaseDenied,
            ErrorCode::StaffNotFound,
            ErrorCode::StaffInactive,
            ErrorCode::StaffRequired,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
            ErrorCode::NetworkError,
            ErrorCode::TimeoutError,
            ErrorCode::ConfigError,
            ErrorCode::PrinterNotAvailable,
            ErrorCode::PrintFailed,
            ErrorCode::ClientDisconnected,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(1001), Err(InvalidErrorCode(1001)));
    }

    #[test]
    fn test_serialize_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::OrderNotFound).unwrap(), "4001");
        let code: ErrorCode = serde_json::from_str("7003").unwrap();
        assert_eq!(code, ErrorCode::TableLocked);
        assert!(serde_json::from_str::<ErrorCode>("10000").is_err());
    }

    #[test]
    fn test_display_and_message() {
        assert_eq!(format!("{}", ErrorCode::OrderNotFound), "4001");
        assert_eq!(ErrorCode::OrderNotFound.message(), "Order not found");
    }
}
