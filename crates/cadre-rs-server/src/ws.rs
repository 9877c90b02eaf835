//! WebSocket event stream forwarding broadcast events to clients.

use crate::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use log::{debug, warn};
use tokio::sync::broadcast::error::RecvError;

/// Upgrade handler for `GET /api/events`.
pub async fn events_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| stream_events(socket, state))
}

/// Forward every broadcast event to the socket as a JSON text frame.
async fn stream_events(socket: WebSocket, state: AppState) {
    let mut receiver = state.event_bus.subscribe();
    let (mut sink, mut stream) = socket.split();
    debug!("event stream subscriber connected");

    loop {
        tokio::select! {
            event = receiver.recv() => match event {
                Ok(event) => {
                    let frame = match serde_json::to_string(&event) {
                        Ok(frame) => frame,
                        Err(err) => {
                            warn!("failed to encode event (event_id={}): {err}", event.id);
                            continue;
                        }
                    };
                    if sink.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("event stream subscriber lagged (skipped={skipped})");
                }
                Err(RecvError::Closed) => break,
            },
            inbound = stream.next() => match inbound {
                // Clients only listen; any close or error ends the stream.
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    debug!("event stream subscriber disconnected");
}
