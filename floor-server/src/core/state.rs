//! Server State
//!
//! Every handle here is cheap to clone; axum clones the state per request.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::catalog::{Collaborators, InMemoryCatalog};
use crate::core::{BackgroundTasks, Config, Result, TaskKind};
use crate::orders::{OrderStorage, OrdersManager};
use crate::printing::PrintDispatcher;
use crate::table_lock::{TableLockActor, TableLockRegistry, run_sweeper};

/// Command channel depth for the table lock actor
const LOCK_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    /// Order ledger
    pub orders: OrdersManager,
    /// Table reservation locks
    pub locks: TableLockRegistry,
    /// Collaborator registries (foods, stations, tables, staff, settings)
    pub catalog: Arc<InMemoryCatalog>,
    /// Cancelled on server shutdown; long-lived sessions watch it
    pub shutdown: CancellationToken,
    pub started_at: Instant,
}

impl ServerState {
    /// Assemble state from already-built parts
    ///
    /// Usually [`initialize()`](Self::initialize) is what you want.
    pub fn new(
        config: Config,
        orders: OrdersManager,
        locks: TableLockRegistry,
        catalog: Arc<InMemoryCatalog>,
    ) -> Self {
        Self {
            config,
            orders,
            locks,
            catalog,
            shutdown: CancellationToken::new(),
            started_at: Instant::now(),
        }
    }

    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Build state from configuration
    ///
    /// In order:
    /// 1. work dir
    /// 2. catalog seed (`catalog.json`, optional)
    /// 3. order database (`orders.redb`)
    /// 4. table lock actor and its sweeper, registered on `tasks`
    pub fn initialize(config: &Config, tasks: &mut BackgroundTasks) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let catalog = Arc::new(InMemoryCatalog::load(&config.catalog_path())?);
        tracing::info!(catalog = ?catalog, "Catalog loaded");

        let storage = OrderStorage::open(config.database_path())?;
        tracing::info!(
            path = %config.database_path().display(),
            orders = storage.order_count()?,
            "Order database opened"
        );

        let dispatcher = PrintDispatcher::new(
            config.print_timeout(),
            config.printer_port,
            config.timezone,
        );
        let orders = OrdersManager::new(
            storage,
            Collaborators::from_memory(catalog.clone()),
            dispatcher,
            config.table_release_point,
            config.timezone,
        );

        let (actor, locks) = TableLockActor::new(LOCK_CHANNEL_CAPACITY);
        tasks.spawn(
            "table_lock_actor",
            TaskKind::Worker,
            actor.run(tasks.shutdown_token()),
        );
        tasks.spawn(
            "table_lock_sweeper",
            TaskKind::Periodic,
            run_sweeper(
                locks.clone(),
                config.table_lock_ttl(),
                config.table_lock_sweep_interval(),
                tasks.shutdown_token(),
            ),
        );

        let state = Self::new(config.clone(), orders, locks, catalog)
            .with_shutdown(tasks.shutdown_token());
        Ok(state)
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
