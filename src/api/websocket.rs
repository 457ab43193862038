//! WebSocket route for the broadcast channel.
//!
//! Connection lifecycle: connect → optional group-join message(s) →
//! receive zero or more event frames → disconnect. No ticket, no
//! heartbeat, no replay — the transport's own keep-alive is the only
//! liveness mechanism, and dashboards poll the REST aggregations as
//! their durability backstop.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};

use crate::api::types::ApiContext;
use crate::broadcast::ClientMessage;
use crate::state::AppState;

/// `GET /ws` — upgrade and subscribe to the broadcast hub.
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(ctx): State<ApiContext>) -> impl IntoResponse {
    let app = ctx.app.clone();
    ws.on_upgrade(move |socket| handle_ws(socket, app))
}

/// Main WebSocket connection handler.
///
/// Spawns a sender task forwarding hub events to the socket, then reads
/// group-join messages until the client disconnects. Malformed frames are
/// ignored; they never terminate the connection.
async fn handle_ws(socket: WebSocket, app: Arc<AppState>) {
    let (ws_sink, mut ws_stream) = socket.split();
    let (subscriber_id, rx) = app.hub.subscribe();

    tracing::info!(subscriber = %subscriber_id, "broadcast client connected");

    let sender_handle = tokio::spawn(async move {
        let mut sink = ws_sink;
        let mut rx = rx;
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(j) => j,
                Err(_) => continue,
            };
            if sink.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(Message::Text(ref text)) => {
                if let Ok(ClientMessage::JoinRoom(room)) = serde_json::from_str(text) {
                    app.hub.join(subscriber_id, &room);
                    tracing::debug!(subscriber = %subscriber_id, room = %room, "joined room");
                }
            }
            Ok(Message::Close(_)) | Err(_) => break,
            _ => {} // Ping/Pong handled by the transport
        }
    }

    // Unsubscribing drops the hub's sender; the sender task then drains
    // and exits.
    app.hub.unsubscribe(subscriber_id);
    let _ = sender_handle.await;

    tracing::info!(subscriber = %subscriber_id, "broadcast client disconnected");
}
