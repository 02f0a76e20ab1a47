//! Dining table API
//!
//! Floor view plus an HTTP mirror of the table lock session surface.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/locks", get(handler::list_locks))
        .route(
            "/{id}/lock",
            post(handler::acquire_lock).delete(handler::release_lock),
        )
}
