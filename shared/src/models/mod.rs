//! Data models
//!
//! Shared between floor-server and its clients (via API). All IDs are
//! strings issued by the owning registry.

pub mod category;
pub mod dining_table;
pub mod food;
pub mod order;
pub mod printer;
pub mod printing;
pub mod settings;
pub mod staff;
pub mod table_lock;

// Re-exports
pub use category::*;
pub use dining_table::*;
pub use food::*;
pub use order::*;
pub use printer::*;
pub use printing::*;
pub use settings::*;
pub use staff::*;
pub use table_lock::*;
