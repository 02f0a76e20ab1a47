//! redb-based order storage
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` (JSON) | Order aggregate |
//! | `daily_numbers` | `(order_date, daily_number)` | `order_id` | Uniqueness index, per-day listing |
//! | `daily_counter` | `order_date` | `u32` | Last number handed out per day |
//!
//! Order creation reads the day's counter, increments it and inserts the
//! order in one write transaction. redb allows a single writer at a time, so
//! two concurrent creations can never observe the same counter value.

use chrono::NaiveDate;
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use shared::models::Order;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// key = (YYYY-MM-DD, daily_number), value = order_id
const DAILY_NUMBERS_TABLE: TableDefinition<(&str, u32), &str> =
    TableDefinition::new("daily_numbers");

/// key = YYYY-MM-DD, value = last assigned daily number
const DAILY_COUNTER_TABLE: TableDefinition<&str, u32> = TableDefinition::new("daily_counter");

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order already exists: {0}")]
    OrderExists(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[derive(Clone)]
pub struct OrderStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for OrderStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStorage").finish_non_exhaustive()
    }
}

impl OrderStorage {
    /// Open or create the database file
    ///
    /// Commits are durable once `commit()` returns.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::init(Database::create(path)?)
    }

    /// In-memory database for tests
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?,
        )
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(DAILY_NUMBERS_TABLE)?;
            let _ = write_txn.open_table(DAILY_COUNTER_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    fn read_order_txn(txn: &WriteTransaction, order_id: &str) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn write_order_txn(txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.id.as_str(), value.as_slice())?;
        Ok(())
    }

    // ========== Writes ==========

    /// Persist a new order, assigning the next daily number for its
    /// `order_date`
    pub fn create_order(&self, mut order: Order) -> StorageResult<Order> {
        let txn = self.db.begin_write()?;
        if Self::read_order_txn(&txn, &order.id)?.is_some() {
            return Err(StorageError::OrderExists(order.id));
        }

        let day = date_key(order.order_date);
        {
            let mut counter = txn.open_table(DAILY_COUNTER_TABLE)?;
            let last = counter.get(day.as_str())?.map(|g| g.value()).unwrap_or(0);
            order.daily_number = last + 1;
            counter.insert(day.as_str(), order.daily_number)?;

            let mut numbers = txn.open_table(DAILY_NUMBERS_TABLE)?;
            numbers.insert((day.as_str(), order.daily_number), order.id.as_str())?;
        }
        Self::write_order_txn(&txn, &order)?;
        txn.commit()?;

        Ok(order)
    }

    /// Read-modify-write one order in a single transaction
    ///
    /// When `f` fails nothing is written and its error is returned.
    pub fn update_order<T, E>(
        &self,
        order_id: &str,
        f: impl FnOnce(&mut Order) -> Result<T, E>,
    ) -> Result<(Order, T), E>
    where
        E: From<StorageError>,
    {
        let txn = self.db.begin_write().map_err(StorageError::from)?;
        let mut order = Self::read_order_txn(&txn, order_id)?
            .ok_or_else(|| StorageError::OrderNotFound(order_id.to_string()))?;

        let output = f(&mut order)?;

        Self::write_order_txn(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;
        Ok((order, output))
    }

    /// Remove an order and its daily index entry once `check` accepts it
    ///
    /// The day's counter is left alone, so a number is never reused.
    pub fn delete_order<E>(
        &self,
        order_id: &str,
        check: impl FnOnce(&Order) -> Result<(), E>,
    ) -> Result<Order, E>
    where
        E: From<StorageError>,
    {
        let txn = self.db.begin_write().map_err(StorageError::from)?;
        let order = Self::read_order_txn(&txn, order_id)?
            .ok_or_else(|| StorageError::OrderNotFound(order_id.to_string()))?;
        check(&order)?;

        Self::remove_order_txn(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(order)
    }

    fn remove_order_txn(txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut orders = txn.open_table(ORDERS_TABLE)?;
        orders.remove(order.id.as_str())?;

        let day = date_key(order.order_date);
        let mut numbers = txn.open_table(DAILY_NUMBERS_TABLE)?;
        numbers.remove((day.as_str(), order.daily_number))?;
        Ok(())
    }

    // ========== Reads ==========

    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn all_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        Ok(orders)
    }

    /// Orders of one business date, in daily number order
    pub fn orders_on(&self, date: NaiveDate) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let numbers = read_txn.open_table(DAILY_NUMBERS_TABLE)?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;

        let day = date_key(date);
        let mut result = Vec::new();
        for entry in numbers.range((day.as_str(), 0u32)..=(day.as_str(), u32::MAX))? {
            let (_key, order_id) = entry?;
            if let Some(value) = orders.get(order_id.value())? {
                result.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(result)
    }

    /// Last daily number handed out for a date, 0 when none
    pub fn last_daily_number(&self, date: NaiveDate) -> StorageResult<u32> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DAILY_COUNTER_TABLE)?;
        Ok(table
            .get(date_key(date).as_str())?
            .map(|g| g.value())
            .unwrap_or(0))
    }

    pub fn order_count(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        Ok(table.len()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderStatus;

    fn test_order(id: &str, date: NaiveDate) -> Order {
        Order::new(id, date, "t-1", "w-1", shared::util::now_millis())
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_daily_numbers_restart_each_day() {
        let storage = OrderStorage::open_in_memory().unwrap();

        let a = storage.create_order(test_order("a", day(15))).unwrap();
        let b = storage.create_order(test_order("b", day(15))).unwrap();
        let c = storage.create_order(test_order("c", day(16))).unwrap();

        assert_eq!(a.daily_number, 1);
        assert_eq!(b.daily_number, 2);
        assert_eq!(c.daily_number, 1);
        assert_eq!(storage.last_daily_number(day(15)).unwrap(), 2);
        assert_eq!(storage.last_daily_number(day(17)).unwrap(), 0);
    }

    #[test]
    fn test_deleted_number_is_not_reused() {
        let storage = OrderStorage::open_in_memory().unwrap();
        storage.create_order(test_order("a", day(15))).unwrap();
        storage.create_order(test_order("b", day(15))).unwrap();

        storage
            .delete_order::<StorageError>("b", |_| Ok(()))
            .unwrap();
        let c = storage.create_order(test_order("c", day(15))).unwrap();

        assert_eq!(c.daily_number, 3);
        let ids: Vec<_> = storage
            .orders_on(day(15))
            .unwrap()
            .into_iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let storage = OrderStorage::open_in_memory().unwrap();
        storage.create_order(test_order("a", day(15))).unwrap();
        assert!(matches!(
            storage.create_order(test_order("a", day(15))),
            Err(StorageError::OrderExists(_))
        ));
        assert_eq!(storage.last_daily_number(day(15)).unwrap(), 1);
    }

    #[test]
    fn test_update_order_commits_or_discards() {
        let storage = OrderStorage::open_in_memory().unwrap();
        storage.create_order(test_order("a", day(15))).unwrap();

        let (order, ()) = storage
            .update_order::<_, StorageError>("a", |o| {
                o.status = OrderStatus::Preparing;
                Ok(())
            })
            .unwrap();
        assert_eq!(order.status, OrderStatus::Preparing);

        let failed = storage.update_order::<(), StorageError>("a", |o| {
            o.status = OrderStatus::Cancelled;
            Err(StorageError::OrderNotFound("simulated".into()))
        });
        assert!(failed.is_err());
        assert_eq!(
            storage.get_order("a").unwrap().unwrap().status,
            OrderStatus::Preparing
        );

        assert!(matches!(
            storage.update_order::<(), StorageError>("missing", |_| Ok(())),
            Err(StorageError::OrderNotFound(_))
        ));
    }

    #[test]
    fn test_reopen_file_keeps_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.redb");
        {
            let storage = OrderStorage::open(&path).unwrap();
            storage.create_order(test_order("a", day(15))).unwrap();
        }
        let storage = OrderStorage::open(&path).unwrap();
        let b = storage.create_order(test_order("b", day(15))).unwrap();
        assert_eq!(b.daily_number, 2);
        assert_eq!(storage.order_count().unwrap(), 2);
    }
}
