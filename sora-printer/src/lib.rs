//! # sora-printer
//!
//! ESC/POS thermal printer library - low-level printing capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS command building
//! - CP866 encoding for Cyrillic thermal printers
//! - Network printing (raw TCP, port 9100)
//!
//! Business logic (WHAT to print) stays in application code:
//! - Kitchen tickets and cashier receipts → floor-server
//!
//! ## Example
//!
//! ```ignore
//! use sora_printer::{EscPosBuilder, NetworkPrinter, Printer};
//!
//! let mut builder = EscPosBuilder::new(48);
//! builder.center();
//! builder.double_size();
//! builder.line("ZAKAZ");
//! builder.reset_size();
//! builder.sep_double();
//! builder.left();
//! builder.line("Stol: A1");
//! builder.cut();
//!
//! let printer = NetworkPrinter::new("192.168.0.106", 9100)?;
//! printer.print(&builder.build()).await?;
//! ```

mod encoding;
mod error;
mod escpos;
mod printer;

// Re-exports
pub use encoding::{convert_to_cp866, pad_text, text_width, truncate_text};
pub use error::{PrintError, PrintResult};
pub use escpos::EscPosBuilder;
pub use printer::{DEFAULT_PORT, NetworkPrinter, Printer};
