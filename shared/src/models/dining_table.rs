//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Coarse table availability
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    #[default]
    Free,
    Occupied,
}

/// Dining table entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiningTable {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: TableStatus,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
