//! HTTP API request/response DTOs.

use serde::{Deserialize, Serialize};

/// Body of `POST /System/Broadcast`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastRequest {
    pub message: String,
}

/// Response of `POST /System/Broadcast`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastResponse {
    pub status: String,
    pub recipients: usize,
}

/// Response of `GET /api/hub`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubStateDto {
    pub connections: Vec<ConnectionDto>,
    pub groups: Vec<GroupDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionDto {
    pub connection_id: String,
    pub state: String,
    pub connected_at: Option<String>, // ISO 8601
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDto {
    pub name: String,
    pub members: Vec<String>,
}
