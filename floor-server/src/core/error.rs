use thiserror::Error;

use crate::catalog::CatalogError;
use crate::orders::StorageError;

/// Startup and serve failures
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Order storage: {0}")]
    Storage(#[from] StorageError),

    #[error("Catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
