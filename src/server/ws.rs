//! Websocket session
//!
//! Each upgraded connection runs two halves:
//! - writer: drains the hub subscription queue into the socket
//! - reader: handles `submit` frames from the client
//!
//! Whichever half finishes first ends the session, and the subscriber is
//! unregistered from the hub.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::{SinkExt, StreamExt};

use crate::actor::LeaderboardHandle;
use crate::hub::SubscriberId;
use crate::protocol::ClientMessage;

/// Upgrade handler for `/api/leaderboard/ws`
pub async fn upgrade(ws: WebSocketUpgrade, State(handle): State<LeaderboardHandle>) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, handle))
}

async fn run_session(socket: WebSocket, handle: LeaderboardHandle) {
    let subscription = match handle.subscribe().await {
        Ok(subscription) => subscription,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to register subscriber");
            return;
        }
    };

    let (id, mut updates) = subscription.into_parts();
    let (mut sink, mut stream) = socket.split();

    let mut writer = tokio::spawn(async move {
        while let Some(payload) = updates.recv().await {
            // axum's text frame owns its String; one copy per connection
            if let Err(e) = sink.send(Message::Text(payload.to_string())).await {
                tracing::debug!(subscriber = id, error = %e, "Websocket send failed");
                break;
            }
        }
    });

    let reader = async {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => handle_client_message(&handle, id, &text).await,
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(subscriber = id, error = %e, "Websocket receive failed");
                    break;
                }
            }
        }
    };

    tokio::select! {
        _ = &mut writer => {}
        _ = reader => {}
    }

    writer.abort();
    handle.unsubscribe(id).await;

    tracing::debug!(subscriber = id, "Websocket closed");
}

/// Handle one inbound text frame
///
/// Malformed or rejected messages are logged and dropped; the connection
/// stays open.
async fn handle_client_message(handle: &LeaderboardHandle, id: SubscriberId, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(subscriber = id, error = %e, "Dropping malformed message");
            return;
        }
    };

    match message {
        ClientMessage::Submit(request) => {
            let submission = match request.validate() {
                Ok(submission) => submission,
                Err(e) => {
                    tracing::warn!(subscriber = id, error = %e, "Dropping invalid submission");
                    return;
                }
            };

            if let Err(e) = handle.submit(submission).await {
                tracing::warn!(subscriber = id, error = %e, "Websocket submission failed");
            }
        }
    }
}
