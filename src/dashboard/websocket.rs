//! WebSocket handler for data-refresh notifications

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::api::AppState;
use crate::dashboard::types::{UpdateType, WebSocketUpdate};
use crate::data::DatasetStatus;

/// Handles WebSocket upgrade requests for dashboard real-time updates
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles an established WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut rx = state.ws_broadcast.subscribe();

    let send_task = tokio::spawn(async move {
        while let Ok(update) = rx.recv().await {
            match serde_json::to_string(&update) {
                Ok(json) => {
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize WebSocket update");
                }
            }
        }
    });

    // Drain incoming frames until the client closes
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    join_first(send_task, recv_task).await;
}

/// Wait for either task to finish and abort the other one.
async fn join_first(mut a: JoinHandle<()>, mut b: JoinHandle<()>) {
    tokio::select! {
        _ = &mut a => b.abort(),
        _ = &mut b => a.abort(),
    }
}

/// Create a data refreshed update message
pub fn create_data_refreshed_update(status: &DatasetStatus) -> WebSocketUpdate {
    WebSocketUpdate {
        update_type: UpdateType::DataRefreshed,
        data: serde_json::to_value(status).unwrap_or(serde_json::Value::Null),
    }
}

/// Create a refresh failure update message
pub fn create_refresh_failed_update(errors: &[String]) -> WebSocketUpdate {
    WebSocketUpdate {
        update_type: UpdateType::RefreshFailed,
        data: serde_json::json!({ "errors": errors }),
    }
}
