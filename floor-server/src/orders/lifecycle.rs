//! Table lifecycle bridge
//!
//! Flips table occupancy alongside order transitions. Occupancy is a floor
//! display aid: a failed update is logged and the order transition stands.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::models::TableStatus;

use crate::catalog::TableRegistry;

/// Transition at which service is considered over and the table is freed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableReleasePoint {
    Completion,
    #[default]
    Payment,
}

impl fmt::Display for TableReleasePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completion => f.write_str("completion"),
            Self::Payment => f.write_str("payment"),
        }
    }
}

impl FromStr for TableReleasePoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "completion" | "completed" | "close" => Ok(Self::Completion),
            "payment" | "paid" => Ok(Self::Payment),
            other => Err(format!("unknown table release point: {other}")),
        }
    }
}

#[derive(Clone)]
pub struct TableLifecycle {
    tables: Arc<dyn TableRegistry>,
    release_point: TableReleasePoint,
}

impl TableLifecycle {
    pub fn new(tables: Arc<dyn TableRegistry>, release_point: TableReleasePoint) -> Self {
        Self {
            tables,
            release_point,
        }
    }

    pub fn release_point(&self) -> TableReleasePoint {
        self.release_point
    }

    pub fn occupy(&self, table_id: &str) {
        self.set(table_id, TableStatus::Occupied);
    }

    pub fn free(&self, table_id: &str) {
        self.set(table_id, TableStatus::Free);
    }

    fn set(&self, table_id: &str, status: TableStatus) {
        match self.tables.set_occupancy(table_id, status) {
            Ok(()) => tracing::debug!(table_id = %table_id, status = ?status, "Table occupancy updated"),
            Err(e) => {
                tracing::warn!(table_id = %table_id, status = ?status, error = %e, "Failed to update table occupancy")
            }
        }
    }
}
