use shared::error::{AppError, ErrorCode};
use shared::models::TableLock;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LockError {
    #[error("Table {} is held by {} since {}", .current.table_id, .current.holder_name, .current.acquired_at)]
    Conflict { current: TableLock },

    #[error("Table {table_id} is not held by {holder_id}")]
    Denied {
        table_id: String,
        holder_id: String,
        current: Option<TableLock>,
    },

    #[error("Table lock registry is not running")]
    Closed,
}

pub type LockResult<T> = Result<T, LockError>;

impl From<LockError> for AppError {
    fn from(err: LockError) -> Self {
        let message = err.to_string();
        match err {
            LockError::Conflict { current } => {
                AppError::with_message(ErrorCode::TableLocked, message)
                    .with_detail("table_id", current.table_id)
                    .with_detail("holder_id", current.holder_id)
                    .with_detail("holder_name", current.holder_name)
                    .with_detail("acquired_at", current.acquired_at)
            }
            LockError::Denied {
                table_id,
                holder_id,
                current,
            } => {
                let mut err = AppError::with_message(ErrorCode::TableReleaseDenied, message)
                    .with_detail("table_id", table_id)
                    .with_detail("holder_id", holder_id);
                if let Some(current) = current {
                    err = err.with_detail("current_holder_id", current.holder_id);
                }
                err
            }
            LockError::Closed => AppError::internal(message),
        }
    }
}
