use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::message::{ChatMessage, NewMessage};
use crate::services::message_service::MessageService;
use crate::state::AppState;
use crate::websocket::message_types::{WsInboundEvent, WsOutboundEvent};

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// Locale-formatted short time, computed once at receipt and stored with the
/// message so history replays show the original send time.
fn local_display_time() -> String {
    chrono::Local::now().format("%-I:%M %p").to_string()
}

async fn replay_history(state: &AppState, connection_id: Uuid) {
    match MessageService::recent_history(&state.db, state.config.history_limit).await {
        Ok(messages) => {
            if let Some(text) = (WsOutboundEvent::ChatHistory { messages }).to_json() {
                state.registry.emit_to(connection_id, &text).await;
            }
        }
        Err(e) => {
            // The connection proceeds without history rather than failing.
            error!(%connection_id, error=%e, "failed to load chat history");
        }
    }
}

async fn broadcast_roster(state: &AppState) {
    let users = state.sessions.list_nicknames().await;
    if let Some(text) = (WsOutboundEvent::UpdateUserList { users }).to_json() {
        state.registry.broadcast_all(&text).await;
    }
}

/// Join/leave notices are broadcast-only; they never touch the store.
async fn broadcast_system_notice(state: &AppState, body: String) {
    let notice = ChatMessage::system_notice(body, local_display_time());
    if let Some(text) = (WsOutboundEvent::ChatMessage { message: notice }).to_json() {
        state.registry.broadcast_all(&text).await;
    }
}

async fn handle_ws_event(evt: WsInboundEvent, connection_id: Uuid, state: &AppState) {
    match evt {
        WsInboundEvent::SetNickname { nickname } => {
            // Re-invocation simply overwrites; there are no distinct
            // "renamed" semantics.
            state.sessions.set(connection_id, nickname.clone()).await;
            broadcast_roster(state).await;
            broadcast_system_notice(state, format!("{nickname} joined")).await;
        }
        WsInboundEvent::ChatMessage {
            sender_name,
            body,
            image,
        } => {
            let new_message = NewMessage {
                sender_name,
                body,
                image,
                display_time: local_display_time(),
            };
            match MessageService::append(&state.db, new_message).await {
                Ok(stored) => {
                    // Broadcast the stored record, store-assigned id and
                    // timestamp included, so every client sees exactly what
                    // a later history query would return.
                    if let Some(text) =
                        (WsOutboundEvent::ChatMessage { message: stored }).to_json()
                    {
                        state.registry.broadcast_all(&text).await;
                    }
                }
                Err(e) => {
                    // Dropped silently from the client's point of view; the
                    // connection stays up.
                    error!(%connection_id, error=%e, "failed to persist chat message");
                }
            }
        }
        WsInboundEvent::Typing => {
            let sender_name = state.sessions.get(connection_id).await.unwrap_or_default();
            if let Some(text) = (WsOutboundEvent::Typing { sender_name }).to_json() {
                state.registry.broadcast_others(connection_id, &text).await;
            }
        }
        WsInboundEvent::StopTyping => {
            if let Some(text) = WsOutboundEvent::StopTyping.to_json() {
                state.registry.broadcast_others(connection_id, &text).await;
            }
        }
    }
}

/// Returns false when the connection should be torn down.
async fn handle_client_message(
    incoming: &Option<Result<Message, axum::Error>>,
    connection_id: Uuid,
    state: &AppState,
) -> bool {
    match incoming {
        Some(Ok(Message::Text(txt))) => {
            match serde_json::from_str::<WsInboundEvent>(txt) {
                Ok(evt) => handle_ws_event(evt, connection_id, state).await,
                Err(e) => {
                    // Malformed frames never terminate the connection.
                    warn!(%connection_id, error=%e, "ignoring unparseable client event");
                }
            }
            true
        }
        Some(Ok(Message::Ping(_))) => {
            // Pong is handled by the framework
            true
        }
        Some(Ok(Message::Close(_))) | None => false,
        Some(Err(_)) => false,
        _ => true,
    }
}

async fn handle_socket(state: AppState, socket: WebSocket) {
    let connection_id = Uuid::new_v4();
    info!(%connection_id, "client connected");

    // Register with the hub before fetching history so messages arriving
    // during the fetch are queued on this connection's channel rather than
    // lost.
    let mut rx = state.registry.register(connection_id).await;
    let (mut sender, mut receiver) = socket.split();

    replay_history(&state, connection_id).await;

    loop {
        tokio::select! {
            maybe = rx.recv() => {
                match maybe {
                    Some(text) => {
                        if sender.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            incoming = receiver.next() => {
                if !handle_client_message(&incoming, connection_id, &state).await {
                    break;
                }
            }
        }
    }

    state.registry.unregister(connection_id).await;

    // A connection that never set a nickname was never in the roster, so
    // its departure produces no broadcasts at all.
    if let Some(nickname) = state.sessions.remove(connection_id).await {
        info!(%connection_id, %nickname, "client disconnected");
        broadcast_roster(&state).await;
        broadcast_system_notice(&state, format!("{nickname} left")).await;
    } else {
        info!(%connection_id, "client disconnected");
    }
}
