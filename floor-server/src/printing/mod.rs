//! Station printing
//!
//! - [`TicketRenderer`]: kitchen tickets and cashier receipts as ESC/POS
//! - [`PrintDispatcher`]: per-station fan-out with partial-failure results

pub mod dispatcher;
pub mod renderer;

pub use dispatcher::{DispatchError, PrintDispatcher};
pub use renderer::TicketRenderer;
