//! Server Implementation
//!
//! Binds the HTTP / WebSocket listener and serves until ctrl-c, then stops
//! background tasks.

use crate::api;
use crate::core::{BackgroundTasks, Config, Result, ServerState};

pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        let mut tasks = BackgroundTasks::new();
        let state = ServerState::initialize(&self.config, &mut tasks)?;
        tasks.log_summary();

        let app = api::router(state);
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(%addr, environment = %self.config.environment, "Floor server listening");

        let shutdown_token = tasks.shutdown_token();
        let shutdown = async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
            shutdown_token.cancel();
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tasks.shutdown().await;
        Ok(())
    }
}
