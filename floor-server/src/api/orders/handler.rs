//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    CompletedOrdersFilter, CreateOrderRequest, DailySalesSummary, Order, PaymentRequest,
    PrintResult, UpdateStatusRequest,
};

use crate::api::StaffId;
use crate::core::ServerState;
use crate::orders::OrderOutcome;
use crate::utils::{AppResult, time};

/// POST /api/orders
pub async fn create(
    State(state): State<ServerState>,
    StaffId(staff_id): StaffId,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<OrderOutcome>> {
    let outcome = state.orders.create_order(&staff_id, payload).await?;
    Ok(Json(outcome))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.get_order(&id)?))
}

/// GET /api/orders/table/{table_id}
pub async fn by_table(
    State(state): State<ServerState>,
    Path(table_id): Path<String>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.orders_by_table(&table_id)?))
}

/// PUT /api/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.update_status(&id, &payload.status)?))
}

/// DELETE /api/orders/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.delete_order(&id)?))
}

/// GET /api/orders/busy-tables
pub async fn busy_tables(State(state): State<ServerState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.orders.busy_tables()?))
}

/// GET /api/orders/my-pending
pub async fn my_pending(
    State(state): State<ServerState>,
    StaffId(staff_id): StaffId,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.my_pending(&staff_id)?))
}

/// POST /api/orders/{id}/close
pub async fn close(
    State(state): State<ServerState>,
    StaffId(staff_id): StaffId,
    Path(id): Path<String>,
) -> AppResult<Json<OrderOutcome>> {
    Ok(Json(state.orders.close_order(&id, &staff_id).await?))
}

/// POST /api/orders/{id}/payment
pub async fn payment(
    State(state): State<ServerState>,
    StaffId(staff_id): StaffId,
    Path(id): Path<String>,
    Json(payload): Json<PaymentRequest>,
) -> AppResult<Json<OrderOutcome>> {
    Ok(Json(
        state.orders.process_payment(&id, &staff_id, payload).await?,
    ))
}

/// POST /api/orders/{id}/reprint
pub async fn reprint_receipt(
    State(state): State<ServerState>,
    StaffId(staff_id): StaffId,
    Path(id): Path<String>,
) -> AppResult<Json<OrderOutcome>> {
    Ok(Json(state.orders.reprint_receipt(&id, &staff_id).await?))
}

/// POST /api/orders/{id}/reprint-kitchen
pub async fn reprint_kitchen(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<PrintResult>>> {
    Ok(Json(state.orders.reprint_kitchen(&id).await?))
}

/// GET /api/orders/completed?start_date=&end_date=&staff_id=&paid=&limit=
pub async fn completed(
    State(state): State<ServerState>,
    Query(filter): Query<CompletedOrdersFilter>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.completed_orders(&filter)?))
}

/// GET /api/orders/pending-payments
pub async fn pending_payments(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.pending_payments()?))
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// `YYYY-MM-DD`, defaults to today
    pub date: Option<String>,
}

/// GET /api/orders/daily-summary?date=
pub async fn daily_summary(
    State(state): State<ServerState>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<DailySalesSummary>> {
    let date = query.date.as_deref().map(time::parse_date).transpose()?;
    Ok(Json(state.orders.daily_sales_summary(date)?))
}
