//! Order ledger
//!
//! - **storage**: redb persistence, daily numbering
//! - **money**: decimal arithmetic for subtotal, service and tax
//! - **payment**: tender reconciliation
//! - **lifecycle**: table occupancy alongside transitions
//! - **manager**: [`OrdersManager`], the only writer of orders
//!
//! ```text
//! HTTP handler ──> OrdersManager ──> OrderStorage (redb, one txn per change)
//!                       │
//!                       ├──> TableLifecycle (after commit)
//!                       └──> PrintDispatcher (after commit)
//! ```

pub mod lifecycle;
pub mod manager;
pub mod money;
pub mod payment;
pub mod storage;

pub use lifecycle::{TableLifecycle, TableReleasePoint};
pub use manager::{ManagerError, ManagerResult, OrderOutcome, OrdersManager};
pub use storage::{OrderStorage, StorageError, StorageResult};
