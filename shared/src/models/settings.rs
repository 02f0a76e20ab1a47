//! Settings Model

use serde::{Deserialize, Serialize};

/// Restaurant settings (singleton)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub restaurant_name: String,
    pub address: String,
    pub phone: String,
    pub currency: String,
    /// Service charge, percent of subtotal
    pub service_percent: f64,
    /// Tax, percent of subtotal
    pub tax_percent: f64,
    pub receipt_footer: String,
    /// Cashier printer address (`ip` or `ip:port`)
    pub cashier_printer_ip: Option<String>,
    /// Print the receipt automatically on close
    pub auto_print: bool,
    /// Receipt copies, 1..=5
    pub print_copies: u8,
    /// Freeze service/tax/total at order creation instead of completion
    pub charges_at_creation: bool,
}

impl Settings {
    pub const MAX_PRINT_COPIES: u8 = 5;

    /// `print_copies` clamped to 1..=5
    pub fn copies(&self) -> u8 {
        self.print_copies.clamp(1, Self::MAX_PRINT_COPIES)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            restaurant_name: "SORA RESTAURANT".to_string(),
            address: "Toshkent sh., Yunusobod tumani".to_string(),
            phone: "+998 90 123 45 67".to_string(),
            currency: "UZS".to_string(),
            service_percent: 10.0,
            tax_percent: 12.0,
            receipt_footer: "Приходите еще!".to_string(),
            cashier_printer_ip: None,
            auto_print: true,
            print_copies: 1,
            charges_at_creation: false,
        }
    }
}
