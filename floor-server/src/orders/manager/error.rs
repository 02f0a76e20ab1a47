use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::orders::storage::StorageError;
use crate::printing::DispatchError;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order has no items")]
    EmptyOrder,

    #[error("Quantity for '{food_id}' must be positive")]
    InvalidQuantity { food_id: String, quantity: u32 },

    #[error("Invalid order status: {0}")]
    InvalidStatus(String),

    #[error("Cannot move order {order_id} from {from} to {to}")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Order {0} is already paid")]
    AlreadyPaid(String),

    #[error("Order {0} is cancelled")]
    Cancelled(String),

    #[error("Order {order_id} is {status}, it must be completed first")]
    NotCompleted {
        order_id: String,
        status: OrderStatus,
    },

    #[error("Order {order_id} is {status} and cannot be deleted")]
    NotDeletable {
        order_id: String,
        status: OrderStatus,
    },

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Staff member required")]
    StaffRequired,

    #[error("Staff not found: {0}")]
    StaffNotFound(String),

    #[error("Staff {0} is not active")]
    StaffInactive(String),

    #[error("Invalid {field}: {value}")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("Insufficient payment: {provided} provided, {required} required")]
    InsufficientAmount { required: f64, provided: f64 },

    #[error("Payment amount {provided} does not match total {required}")]
    AmountMismatch { required: f64, provided: f64 },

    #[error("Split legs {cash} + {card} do not add up to {total}")]
    SplitMismatch { cash: f64, card: f64, total: f64 },
}

pub type ManagerResult<T> = Result<T, ManagerError>;

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        let message = err.to_string();
        match err {
            ManagerError::Storage(StorageError::OrderNotFound(id))
            | ManagerError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, message).with_detail("order_id", id)
            }
            ManagerError::Storage(e) => {
                tracing::error!(error = %e, "Order storage failure");
                AppError::database(message)
            }
            ManagerError::Catalog(e) => e.into(),
            ManagerError::Dispatch(e) => e.into(),
            ManagerError::EmptyOrder => AppError::with_message(ErrorCode::OrderEmpty, message),
            ManagerError::InvalidQuantity { food_id, quantity } => {
                AppError::with_message(ErrorCode::OrderInvalidQuantity, message)
                    .with_detail("food_id", food_id)
                    .with_detail("quantity", quantity)
            }
            ManagerError::InvalidStatus(status) => {
                AppError::with_message(ErrorCode::OrderInvalidStatus, message)
                    .with_detail("status", status)
            }
            ManagerError::InvalidTransition { order_id, from, to } => {
                AppError::with_message(ErrorCode::OrderInvalidTransition, message)
                    .with_detail("order_id", order_id)
                    .with_detail("current_status", from.as_str())
                    .with_detail("requested_status", to.as_str())
            }
            ManagerError::AlreadyPaid(order_id) => {
                AppError::with_message(ErrorCode::OrderAlreadyPaid, message)
                    .with_detail("order_id", order_id)
                    .with_detail("current_status", OrderStatus::Paid.as_str())
            }
            ManagerError::Cancelled(order_id) => {
                AppError::with_message(ErrorCode::OrderCancelled, message)
                    .with_detail("order_id", order_id)
                    .with_detail("current_status", OrderStatus::Cancelled.as_str())
            }
            ManagerError::NotCompleted { order_id, status } => {
                AppError::with_message(ErrorCode::OrderNotCompleted, message)
                    .with_detail("order_id", order_id)
                    .with_detail("current_status", status.as_str())
            }
            ManagerError::NotDeletable { order_id, status } => {
                AppError::with_message(ErrorCode::OrderNotDeletable, message)
                    .with_detail("order_id", order_id)
                    .with_detail("current_status", status.as_str())
            }
            ManagerError::TableNotFound(id) => {
                AppError::with_message(ErrorCode::TableNotFound, message).with_detail("table_id", id)
            }
            ManagerError::StaffRequired => AppError::new(ErrorCode::StaffRequired),
            ManagerError::StaffNotFound(id) => {
                AppError::with_message(ErrorCode::StaffNotFound, message).with_detail("staff_id", id)
            }
            ManagerError::StaffInactive(id) => {
                AppError::with_message(ErrorCode::StaffInactive, message).with_detail("staff_id", id)
            }
            ManagerError::InvalidAmount { field, value } => {
                AppError::with_message(ErrorCode::PaymentInvalidAmount, message)
                    .with_detail("field", field)
                    .with_detail("provided", value)
            }
            ManagerError::InsufficientAmount { required, provided } => {
                AppError::with_message(ErrorCode::PaymentInsufficientAmount, message)
                    .with_detail("required", required)
                    .with_detail("provided", provided)
            }
            ManagerError::AmountMismatch { required, provided } => {
                AppError::with_message(ErrorCode::PaymentAmountMismatch, message)
                    .with_detail("required", required)
                    .with_detail("provided", provided)
            }
            ManagerError::SplitMismatch { cash, card, total } => {
                AppError::with_message(ErrorCode::PaymentSplitMismatch, message)
                    .with_detail("cash", cash)
                    .with_detail("card", card)
                    .with_detail("total", total)
            }
        }
    }
}
