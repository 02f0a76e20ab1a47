use chrono::NaiveDate;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Food not found: {0}")]
    FoodNotFound(String),

    #[error("Food '{name}' is not active")]
    FoodInactive { food_id: String, name: String },

    #[error("Food '{name}' expired on {expired_on}")]
    FoodExpired {
        food_id: String,
        name: String,
        expired_on: NaiveDate,
    },

    #[error("Not enough '{name}' in stock: {available} available, {requested} requested")]
    OutOfStock {
        food_id: String,
        name: String,
        available: u32,
        requested: u32,
    },

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Failed to read catalog seed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog seed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::FoodNotFound(id) => {
                AppError::with_message(ErrorCode::FoodNotFound, message).with_detail("food_id", id)
            }
            CatalogError::FoodInactive { food_id, name } => {
                AppError::with_message(ErrorCode::FoodInactive, message)
                    .with_detail("food_id", food_id)
                    .with_detail("name", name)
            }
            CatalogError::FoodExpired {
                food_id,
                name,
                expired_on,
            } => AppError::with_message(ErrorCode::FoodExpired, message)
                .with_detail("food_id", food_id)
                .with_detail("name", name)
                .with_detail("expired_on", expired_on.to_string()),
            CatalogError::OutOfStock {
                food_id,
                name,
                available,
                requested,
            } => AppError::with_message(ErrorCode::FoodOutOfStock, message)
                .with_detail("food_id", food_id)
                .with_detail("name", name)
                .with_detail("available", available)
                .with_detail("requested", requested),
            CatalogError::TableNotFound(id) => {
                AppError::with_message(ErrorCode::TableNotFound, message).with_detail("table_id", id)
            }
            CatalogError::Io(_) | CatalogError::Json(_) => {
                AppError::with_message(ErrorCode::ConfigError, message)
            }
        }
    }
}
