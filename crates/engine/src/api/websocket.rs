//! WebSocket handling for player connections.
//!
//! Players connect, identify themselves, and then receive dialog requests
//! which they answer with `DialogResponse`.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use iobj_domain::PlayerId;
use iobj_shared::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::connections::ConnectionManager;
use crate::app::App;
use crate::infrastructure::dialog::{DialogAnswer, WsDialogClient};
use crate::use_cases::IdentifyError;

/// Buffer size for per-connection message channel.
const CONNECTION_CHANNEL_BUFFER: usize = 256;

/// Combined state for WebSocket handlers.
pub struct WsState {
    pub app: Arc<App>,
    pub connections: Arc<ConnectionManager>,
    pub dialogs: Arc<WsDialogClient>,
}

/// WebSocket upgrade handler - entry point for new connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);
    state.connections.register(connection_id, tx.clone()).await;

    tracing::info!(connection_id = %connection_id, "WebSocket connection established");

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let response = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(msg) => handle_message(msg, &state, connection_id).await,
                    Err(e) => {
                        tracing::warn!(connection_id = %connection_id, error = %e, "Failed to parse message");
                        Some(protocol_error(
                            "PARSE_ERROR",
                            format!("Invalid message format: {e}"),
                        ))
                    }
                };
                if let Some(response) = response {
                    if tx.try_send(response).is_err() {
                        tracing::warn!(
                            connection_id = %connection_id,
                            "Failed to send response, channel full or closed"
                        );
                    }
                }
            }
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    disconnect(&state, connection_id).await;
    send_task.abort();

    tracing::info!(connection_id = %connection_id, "WebSocket connection terminated");
}

/// Drop the connection, ending the player's dialog session if it was their last.
async fn disconnect(state: &WsState, connection_id: Uuid) {
    if let Some(player_id) = state.connections.unregister(connection_id).await {
        let dropped = state.app.dialog_vars.end_session(&player_id).await;
        tracing::debug!(player_id = %player_id, dropped, "Dialog session ended");
    }
}

async fn handle_message(
    msg: ClientMessage,
    state: &WsState,
    connection_id: Uuid,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::Ping => Some(ServerMessage::Pong),

        ClientMessage::Identify {
            player_id,
            access_token,
        } => {
            let player_id = match state
                .app
                .use_cases
                .identify_player
                .execute(&player_id, &access_token)
                .await
            {
                Ok(player_id) => player_id,
                Err(IdentifyError::EmptyPlayer) => {
                    return Some(protocol_error("INVALID_PLAYER", "Player id is empty"))
                }
                Err(IdentifyError::Rejected) => {
                    return Some(protocol_error("UNAUTHORIZED", "Access token rejected"))
                }
                Err(e @ IdentifyError::Unavailable(_)) => {
                    tracing::error!(connection_id = %connection_id, error = %e, "Cannot verify player");
                    return Some(protocol_error("AUTH_UNAVAILABLE", "Cannot verify player now"));
                }
            };
            match state
                .connections
                .identify(connection_id, player_id.clone())
                .await
            {
                Ok(()) => Some(ServerMessage::Identified {
                    player_id: player_id.to_string(),
                }),
                Err(e) => Some(protocol_error("NOT_CONNECTED", e.to_string())),
            }
        }

        ClientMessage::DialogResponse {
            request_id,
            token,
            msg,
        } => {
            let player_id = state
                .connections
                .get(connection_id)
                .await
                .and_then(|info| info.player_id);
            let Some(player_id) = player_id else {
                return Some(protocol_error(
                    "NOT_IDENTIFIED",
                    "Identify before answering dialogs",
                ));
            };
            state
                .dialogs
                .resolve(&player_id, request_id, DialogAnswer { token, msg });
            None
        }

        ClientMessage::Unknown => Some(protocol_error("UNKNOWN_MESSAGE", "Unknown message type")),
    }
}

fn protocol_error(code: &str, message: impl Into<String>) -> ServerMessage {
    ServerMessage::Error {
        code: code.to_string(),
        message: message.into(),
    }
}
