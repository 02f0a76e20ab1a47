//! Order API Module
//!
//! Every mutation goes through [`OrdersManager`](crate::orders::OrdersManager).
//! Create, close, payment and receipt reprint answer with
//! `{order, print_results}`; printer failures never fail the request.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/table/{table_id}", get(handler::by_table))
        .route("/busy-tables", get(handler::busy_tables))
        .route("/my-pending", get(handler::my_pending))
        .route("/completed", get(handler::completed))
        .route("/pending-payments", get(handler::pending_payments))
        .route("/daily-summary", get(handler::daily_summary))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/{id}/status", put(handler::update_status))
        .route("/{id}/close", post(handler::close))
        .route("/{id}/payment", post(handler::payment))
        .route("/{id}/reprint", post(handler::reprint_receipt))
        .route("/{id}/reprint-kitchen", post(handler::reprint_kitchen))
}
