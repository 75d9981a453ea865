use axum::Router;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use towerwatch_api::ObserverMessage;

use crate::errors::ApiError;
use crate::handles::FleetState;
use crate::services::Observer;

pub fn ws_router(state: FleetState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// Subscribes before upgrading, so the `init` snapshot and the update
/// stream that follows it have no gap between them.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<FleetState>) -> Result<Response, ApiError> {
    let observer = state.fleet.subscribe().await?;

    Ok(ws.on_upgrade(|socket| stream_fleet(socket, observer)).into_response())
}

async fn stream_fleet(socket: WebSocket, observer: Observer) {
    tracing::debug!("Observer connected");

    let (mut sender, mut receiver) = socket.split();
    let Observer { init, receiver: mut updates } = observer;

    if !send(&mut sender, &init).await {
        return;
    }

    loop {
        tokio::select! {
            result = updates.recv() => match result {
                Ok(message) => {
                    if !send(&mut sender, &message).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Observer lagged, skipping ahead");
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("Fleet broadcast closed");
                    break;
                }
            },
            message = receiver.next() => match message {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Ping(data))) => {
                    if sender.send(Message::Pong(data)).await.is_err() {
                        break;
                    }
                }
                Some(Err(e)) => {
                    tracing::debug!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            },
        }
    }

    tracing::debug!("Observer disconnected");
}

async fn send(sender: &mut SplitSink<WebSocket, Message>, message: &ObserverMessage) -> bool {
    let text = match serde_json::to_string(message) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Failed to encode observer message: {}", e);
            return true;
        }
    };

    sender.send(Message::Text(text)).await.is_ok()
}
