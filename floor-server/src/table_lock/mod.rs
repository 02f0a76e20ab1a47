//! Table reservation lock
//!
//! Exclusive, leased ownership of a table while a waiter enters an order.
//! A single actor task owns the lock map; every mutation goes through its
//! command channel, so two concurrent `acquire` calls on one table resolve
//! to exactly one winner. Changes are announced on a broadcast channel for
//! the WebSocket sessions.

mod error;
mod registry;

pub use error::{LockError, LockResult};
pub use registry::{TableLockActor, TableLockRegistry, run_sweeper};
