use std::sync::atomic::Ordering;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Structured health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub connections: ConnectionInfo,
    pub rooms: RoomInfo,
}

#[derive(Serialize)]
pub struct ConnectionInfo {
    pub websocket: usize,
    pub anonymous: usize,
}

#[derive(Serialize)]
pub struct RoomInfo {
    pub active: usize,
    pub occupants: usize,
}

/// Returns server status, connection counts and room info as JSON.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ws = state.ws_connection_count.load(Ordering::Relaxed);

    let (active, occupants, registered) = {
        let sessions = state.sessions.read().await;
        sessions.stats()
    };

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        connections: ConnectionInfo {
            websocket: ws,
            anonymous: registered.saturating_sub(occupants),
        },
        rooms: RoomInfo { active, occupants },
    })
}
