//! Type definitions for dashboard data structures

use serde::{Deserialize, Serialize};

/// WebSocket update message sent to dashboard clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketUpdate {
    /// Type of update
    pub update_type: UpdateType,
    /// JSON payload for the update
    pub data: serde_json::Value,
}

/// Type of WebSocket update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum UpdateType {
    /// A new dataset snapshot is being served
    DataRefreshed,
    /// A refresh cycle failed; the previous snapshot is still served
    RefreshFailed,
}

/// Query string of the page and of `/api/charts`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Selection {
    pub area: Option<String>,
    pub window: Option<String>,
}
