//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use chathub_shared::time::timestamp_to_jst_rfc3339;

use crate::{
    infrastructure::dto::http::{
        BroadcastRequest, BroadcastResponse, ConnectionDto, GroupDto, HubStateDto,
    },
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current connections and groups (for testing and debugging)
pub async fn hub_state(State(state): State<Arc<AppState>>) -> Json<HubStateDto> {
    let snapshot = state.hub.snapshot().await;

    Json(HubStateDto {
        connections: snapshot
            .connections
            .into_iter()
            .map(|connection| ConnectionDto {
                connection_id: connection.id.into_string(),
                state: connection.state.as_str().to_string(),
                connected_at: timestamp_to_jst_rfc3339(connection.connected_at.value()),
            })
            .collect(),
        groups: snapshot
            .groups
            .into_iter()
            .map(|group| GroupDto {
                name: group.name.as_str().to_string(),
                members: group.members.into_iter().map(|id| id.into_string()).collect(),
            })
            .collect(),
    })
}

/// `POST /System/Broadcast`: admin notification to every connection
pub async fn broadcast(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BroadcastRequest>,
) -> Json<BroadcastResponse> {
    let recipients = state.hub.broadcast(&request.message).await;

    Json(BroadcastResponse {
        status: "Broadcast sent".to_string(),
        recipients,
    })
}
