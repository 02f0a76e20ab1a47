//! In-memory collaborator registries
//!
//! Seeded from `catalog.json` in the work dir, or programmatically in tests.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared::models::{Category, DiningTable, Food, Printer, Settings, Staff, TableStatus};

use super::{
    CatalogError, FoodCatalog, SettingsStore, StaffDirectory, StationDirectory, TableRegistry,
};

/// Seed file layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSeed {
    pub foods: Vec<Food>,
    pub categories: Vec<Category>,
    pub printers: Vec<Printer>,
    pub tables: Vec<DiningTable>,
    pub staff: Vec<Staff>,
    pub settings: Settings,
}

#[derive(Default)]
pub struct InMemoryCatalog {
    foods: RwLock<HashMap<String, Food>>,
    categories: RwLock<HashMap<String, Category>>,
    printers: RwLock<HashMap<String, Printer>>,
    tables: RwLock<HashMap<String, DiningTable>>,
    staff: RwLock<HashMap<String, Staff>>,
    settings: RwLock<Settings>,
}

impl std::fmt::Debug for InMemoryCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCatalog")
            .field("foods", &self.foods.read().len())
            .field("categories", &self.categories.read().len())
            .field("printers", &self.printers.read().len())
            .field("tables", &self.tables.read().len())
            .field("staff", &self.staff.read().len())
            .finish()
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: CatalogSeed) -> Self {
        let catalog = Self::new();
        for food in seed.foods {
            catalog.upsert_food(food);
        }
        for category in seed.categories {
            catalog.upsert_category(category);
        }
        for printer in seed.printers {
            catalog.upsert_printer(printer);
        }
        for table in seed.tables {
            catalog.upsert_table(table);
        }
        for staff in seed.staff {
            catalog.upsert_staff(staff);
        }
        catalog.set_settings(seed.settings);
        catalog
    }

    /// Load a seed file; a missing file yields an empty catalog
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Catalog seed not found, starting empty");
            return Ok(Self::new());
        }
        let raw = std::fs::read(path)?;
        let seed: CatalogSeed = serde_json::from_slice(&raw)?;
        tracing::info!(
            foods = seed.foods.len(),
            categories = seed.categories.len(),
            printers = seed.printers.len(),
            tables = seed.tables.len(),
            staff = seed.staff.len(),
            "Catalog seed loaded"
        );
        Ok(Self::from_seed(seed))
    }

    pub fn upsert_food(&self, food: Food) {
        self.foods.write().insert(food.id.clone(), food);
    }

    pub fn upsert_category(&self, category: Category) {
        self.categories.write().insert(category.id.clone(), category);
    }

    pub fn upsert_printer(&self, printer: Printer) {
        self.printers.write().insert(printer.id.clone(), printer);
    }

    pub fn upsert_table(&self, table: DiningTable) {
        self.tables.write().insert(table.id.clone(), table);
    }

    pub fn upsert_staff(&self, staff: Staff) {
        self.staff.write().insert(staff.id.clone(), staff);
    }

    pub fn set_settings(&self, settings: Settings) {
        *self.settings.write() = settings;
    }

    pub fn list_tables(&self) -> Vec<DiningTable> {
        let mut tables: Vec<_> = self.tables.read().values().cloned().collect();
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        tables
    }
}

impl FoodCatalog for InMemoryCatalog {
    fn find_food(&self, food_id: &str) -> Option<Food> {
        self.foods.read().get(food_id).cloned()
    }

    fn reserve_stock(
        &self,
        food_id: &str,
        quantity: u32,
        today: NaiveDate,
    ) -> Result<Food, CatalogError> {
        let mut foods = self.foods.write();
        let food = foods
            .get_mut(food_id)
            .ok_or_else(|| CatalogError::FoodNotFound(food_id.to_string()))?;

        if !food.is_active {
            return Err(CatalogError::FoodInactive {
                food_id: food.id.clone(),
                name: food.name.clone(),
            });
        }
        if let Some(expired_on) = food.expiration_date.filter(|_| food.is_expired(today)) {
            return Err(CatalogError::FoodExpired {
                food_id: food.id.clone(),
                name: food.name.clone(),
                expired_on,
            });
        }
        if food.stock_qty < quantity {
            return Err(CatalogError::OutOfStock {
                food_id: food.id.clone(),
                name: food.name.clone(),
                available: food.stock_qty,
                requested: quantity,
            });
        }

        let snapshot = food.clone();
        food.stock_qty -= quantity;
        Ok(snapshot)
    }

    fn restore_stock(&self, food_id: &str, quantity: u32) {
        if let Some(food) = self.foods.write().get_mut(food_id) {
            food.stock_qty = food.stock_qty.saturating_add(quantity);
        }
    }
}

impl StationDirectory for InMemoryCatalog {
    fn find_category(&self, category_id: &str) -> Option<Category> {
        self.categories.read().get(category_id).cloned()
    }

    fn find_printer(&self, printer_id: &str) -> Option<Printer> {
        self.printers.read().get(printer_id).cloned()
    }
}

impl SettingsStore for InMemoryCatalog {
    fn settings(&self) -> Settings {
        self.settings.read().clone()
    }
}

impl TableRegistry for InMemoryCatalog {
    fn find_table(&self, table_id: &str) -> Option<DiningTable> {
        self.tables.read().get(table_id).cloned()
    }

    fn set_occupancy(&self, table_id: &str, status: TableStatus) -> Result<(), CatalogError> {
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(table_id)
            .ok_or_else(|| CatalogError::TableNotFound(table_id.to_string()))?;
        table.status = status;
        Ok(())
    }
}

impl StaffDirectory for InMemoryCatalog {
    fn find_staff(&self, staff_id: &str) -> Option<Staff> {
        self.staff.read().get(staff_id).cloned()
    }
}
