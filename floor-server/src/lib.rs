//! Sora Floor Server - order fulfillment and dispatch for one restaurant
//!
//! # Overview
//!
//! - **Table reservation lock** (`table_lock`): who is entering an order at
//!   which table, leased and swept when idle
//! - **Order ledger** (`orders`): state machine, daily numbering, charges,
//!   payment reconciliation, persisted in redb
//! - **Print dispatch** (`printing`): per-station kitchen tickets and cashier
//!   receipts over raw TCP
//! - **Collaborators** (`catalog`): foods, stations, tables, staff, settings
//! - **HTTP / WebSocket** (`api`)
//!
//! ```text
//! floor-server/src/
//! ├── core/          # config, state, background tasks, server
//! ├── api/           # HTTP routes and the /ws/tables session
//! ├── catalog/       # collaborator traits and in-memory registries
//! ├── orders/        # ledger, storage, money, payment
//! ├── printing/      # ticket rendering and fan-out
//! ├── table_lock/    # lock actor and sweeper
//! └── utils/         # logging, time
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod orders;
pub mod printing;
pub mod table_lock;
pub mod utils;

pub use core::{Config, Server, ServerState};
pub use orders::{OrderStorage, OrdersManager};
pub use table_lock::TableLockRegistry;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env`, make sure the work dir exists, start logging
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
   _____
  / ___/____  _________ _
  \__ \/ __ \/ ___/ __ `/
 ___/ / /_/ / /  / /_/ /
/____/\____/_/   \__,_/   floor server v{}
    "#,
        env!("CARGO_PKG_VERSION")
    );
}
