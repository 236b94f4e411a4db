//! WebSocket stream of engine events
//!
//! Each connection holds its own engine subscription, cancelled when the
//! client goes away.

use crate::api::handlers::ApiState;
use crate::multisig::Subscription;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Serialize;

/// Control messages sent alongside engine events
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsControl {
    /// Connection established
    Connected {
        message: String,
        owners: Vec<String>,
        quorum: usize,
    },
}

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ApiState>) -> impl IntoResponse {
    let welcome = WsControl::Connected {
        message: "Connected to multisig event stream".to_string(),
        owners: state.engine.owners().owners().to_vec(),
        quorum: state.engine.quorum(),
    };
    let subscription = state.engine.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, subscription, welcome))
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, mut subscription: Subscription, welcome: WsControl) {
    let (mut sender, mut receiver) = socket.split();

    if let Ok(json) = serde_json::to_string(&welcome) {
        let _ = sender.send(Message::Text(json.into())).await;
    }

    // Forward engine events to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = subscription.next().await {
            if let Ok(json) = serde_json::to_string(&event) {
                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
        subscription.cancel();
    });

    // Handle incoming messages (for ping/pong and graceful close)
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(Message::Text(text)) => {
                    log::debug!("Ignoring client message: {}", text);
                }
                Err(e) => {
                    log::warn!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    log::info!("WebSocket connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_serialization() {
        let welcome = WsControl::Connected {
            message: "hi".to_string(),
            owners: vec!["alice".to_string()],
            quorum: 1,
        };

        let json = serde_json::to_value(&welcome).unwrap();
        assert_eq!(json["type"], "Connected");
        assert_eq!(json["data"]["quorum"], 1);
    }
}
