//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{DiningTable, LockHolder, TableLock};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// GET /api/tables - every table with its occupancy
pub async fn list(State(state): State<ServerState>) -> Json<Vec<DiningTable>> {
    Json(state.catalog.list_tables())
}

/// GET /api/tables/locks
pub async fn list_locks(State(state): State<ServerState>) -> AppResult<Json<Vec<TableLock>>> {
    Ok(Json(state.locks.list_locked().await?))
}

/// POST /api/tables/{id}/lock
pub async fn acquire_lock(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(holder): Json<LockHolder>,
) -> AppResult<Json<TableLock>> {
    if holder.holder_id.trim().is_empty() {
        return Err(AppError::validation("holder_id is required"));
    }
    Ok(Json(state.locks.acquire(&id, holder).await?))
}

#[derive(Debug, Deserialize)]
pub struct ReleaseQuery {
    pub holder_id: String,
}

#[derive(Debug, Serialize)]
pub struct ReleaseResponse {
    pub table_id: String,
    pub released: bool,
}

/// DELETE /api/tables/{id}/lock?holder_id=
pub async fn release_lock(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<ReleaseQuery>,
) -> AppResult<Json<ReleaseResponse>> {
    state.locks.release(&id, &query.holder_id).await?;
    Ok(Json(ReleaseResponse {
        table_id: id,
        released: true,
    }))
}
