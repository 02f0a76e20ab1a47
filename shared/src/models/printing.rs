//! Print dispatch records

use serde::{Deserialize, Serialize};

/// Which kind of ticket a station receives
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketKind {
    /// Per-category kitchen ticket
    Kitchen,
    /// Cashier receipt
    Receipt,
}

/// One line on a station ticket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

/// Items routed to one station for one order (never persisted)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationTicket {
    pub station_address: String,
    pub kind: TicketKind,
    pub order_id: String,
    pub order_number: String,
    pub table_name: String,
    pub staff_name: String,
    pub items: Vec<TicketItem>,
}

/// Outcome of sending one ticket to one station
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrintResult {
    pub station_address: String,
    pub kind: TicketKind,
    pub success: bool,
    /// Number of items on the ticket
    pub item_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PrintResult {
    pub fn ok(station_address: impl Into<String>, kind: TicketKind, item_count: usize) -> Self {
        Self {
            station_address: station_address.into(),
            kind,
            success: true,
            item_count,
            error: None,
        }
    }

    pub fn failed(
        station_address: impl Into<String>,
        kind: TicketKind,
        item_count: usize,
        error: impl Into<String>,
    ) -> Self {
        Self {
            station_address: station_address.into(),
            kind,
            success: false,
            item_count,
            error: Some(error.into()),
        }
    }
}
