//! Catalog collaborators
//!
//! The engine only consumes these records; their administration lives
//! elsewhere. Each concern is a trait so a deployment can back it with
//! whatever store it already has. [`InMemoryCatalog`] implements all of them.

mod error;
mod memory;

use std::sync::Arc;

use chrono::NaiveDate;
use shared::models::{Category, DiningTable, Food, Printer, Settings, Staff, TableStatus};

pub use error::CatalogError;
pub use memory::{CatalogSeed, InMemoryCatalog};

pub trait FoodCatalog: Send + Sync {
    fn find_food(&self, food_id: &str) -> Option<Food>;

    /// Validate availability and decrement stock in one step
    ///
    /// Fails when the food is missing, inactive, expired on `today` or has
    /// fewer than `quantity` units. Returns the food as it was before the
    /// decrement.
    fn reserve_stock(&self, food_id: &str, quantity: u32, today: NaiveDate)
    -> Result<Food, CatalogError>;

    /// Give back units taken by [`reserve_stock`](Self::reserve_stock)
    fn restore_stock(&self, food_id: &str, quantity: u32);
}

/// Category -> printer mapping
pub trait StationDirectory: Send + Sync {
    fn find_category(&self, category_id: &str) -> Option<Category>;

    fn find_printer(&self, printer_id: &str) -> Option<Printer>;

    /// Address of the kitchen station serving a category
    fn station_for_category(&self, category_id: &str) -> Option<String> {
        let printer_id = self.find_category(category_id)?.printer_id?;
        let printer = self.find_printer(&printer_id)?;
        let address = printer.ip_address.trim();
        (!address.is_empty()).then(|| address.to_string())
    }
}

pub trait SettingsStore: Send + Sync {
    fn settings(&self) -> Settings;
}

pub trait TableRegistry: Send + Sync {
    fn find_table(&self, table_id: &str) -> Option<DiningTable>;

    fn set_occupancy(&self, table_id: &str, status: TableStatus) -> Result<(), CatalogError>;
}

pub trait StaffDirectory: Send + Sync {
    fn find_staff(&self, staff_id: &str) -> Option<Staff>;
}

/// Handles to every collaborator the order engine consults
#[derive(Clone)]
pub struct Collaborators {
    pub foods: Arc<dyn FoodCatalog>,
    pub stations: Arc<dyn StationDirectory>,
    pub settings: Arc<dyn SettingsStore>,
    pub tables: Arc<dyn TableRegistry>,
    pub staff: Arc<dyn StaffDirectory>,
}

impl Collaborators {
    /// Back every collaborator with the same in-memory catalog
    pub fn from_memory(catalog: Arc<InMemoryCatalog>) -> Self {
        Self {
            foods: catalog.clone(),
            stations: catalog.clone(),
            settings: catalog.clone(),
            tables: catalog.clone(),
            staff: catalog,
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
