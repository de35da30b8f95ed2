//! HTTP API endpoints.
//!
//! Read-only views for operators. Nothing here exposes names, roles or words.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::protocol::RoomSummary;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// List live rooms.
///
/// GET /api/rooms
pub async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummary>> {
    Json(state.room_summaries().await)
}
