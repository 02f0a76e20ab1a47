//! Staff Model

use serde::{Deserialize, Serialize};

/// Waiter / cashier record from the staff directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Staff {
    pub id: String,
    pub display_name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Waiter commission on served orders, percent
    #[serde(default)]
    pub commission_percent: f64,
}

fn default_true() -> bool {
    true
}
