//! Category Model

use serde::{Deserialize, Serialize};

/// Food category; routes kitchen tickets to a printer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub title: String,
    /// Kitchen printer for this category, if any
    #[serde(default)]
    pub printer_id: Option<String>,
}
