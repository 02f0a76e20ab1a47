//! Printer Model

use serde::{Deserialize, Serialize};

/// Station printer entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Printer {
    pub id: String,
    pub name: String,
    /// `ip` or `ip:port`; port defaults to 9100
    pub ip_address: String,
    #[serde(default)]
    pub description: Option<String>,
}
