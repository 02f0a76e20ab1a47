//! Table reservation lock records

use serde::{Deserialize, Serialize};

/// Exclusive reservation of a table by one holder (never persisted)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableLock {
    pub table_id: String,
    pub holder_id: String,
    pub holder_name: String,
    /// Epoch millis, refreshed on re-acquire by the same holder
    pub acquired_at: i64,
}

/// Who is asking for a table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockHolder {
    pub holder_id: String,
    #[serde(default)]
    pub holder_name: String,
}

/// Why a lock went away
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnlockReason {
    Released,
    Disconnect,
    TimeoutCleanup,
}

/// Lock change broadcast to every session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LockEvent {
    TableLocked { lock: TableLock },
    TableUnlocked { table_id: String, holder_id: String, reason: UnlockReason },
}
