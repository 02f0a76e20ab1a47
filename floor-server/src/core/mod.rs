//! Core - configuration, shared state, background tasks, server loop
//!
//! - [`Config`] - server configuration
//! - [`ServerState`] - handles shared by every request
//! - [`BackgroundTasks`] - long-running task registry
//! - [`Server`] - HTTP / WebSocket server

pub mod config;
pub mod error;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
pub use tasks::{BackgroundTasks, TaskKind};
