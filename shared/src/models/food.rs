//! Food Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Menu item as supplied by the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Food {
    pub id: String,
    pub name: String,
    /// Price in whole currency units
    pub price: f64,
    pub category_id: String,
    /// Units left in stock
    #[serde(default)]
    pub stock_qty: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Last day the item may be sold
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    /// Sales unit (dona, kg, litr...)
    #[serde(default)]
    pub unit: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Food {
    /// Whether the item may be sold on `today`
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiration_date.is_some_and(|d| d < today)
    }
}
