use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::extract::FromRequest;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use tandem_core::events::{ClientEvent, ServerEvent};
use tandem_core::protocol::{Frame, WireFormat, decode_client_event, encode_server_event};
use tandem_core::room::ConnectionId;

use crate::state::{AppState, ConnectionGuard};

#[derive(Debug, Default, Deserialize)]
pub struct SocketParams {
    #[serde(default)]
    pub format: WireFormat,
}

pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<SocketParams>,
    request: axum::extract::Request,
) -> Result<axum::response::Response, StatusCode> {
    let max_ws = state.config.limits.max_ws_connections;
    let current = state.ws_connection_count.load(Ordering::Relaxed);
    if current >= max_ws {
        tracing::warn!(current, max = max_ws, "WS connection limit reached");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let ws = WebSocketUpgrade::from_request(request, &state)
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    let format = params.format;
    Ok(ws
        .on_upgrade(move |socket| handle_socket(socket, state, format))
        .into_response())
}

async fn handle_socket(socket: WebSocket, state: AppState, format: WireFormat) {
    let _guard = ConnectionGuard::new(Arc::clone(&state.ws_connection_count));
    let (ws_sender, mut ws_receiver) = socket.split();

    let (tx, rx) = mpsc::channel::<ServerEvent>(state.config.limits.outbound_buffer);
    let connection_id = state.sessions.write().await.connect(tx);
    tracing::info!(connection_id, ?format, "Client connected");

    spawn_writer(ws_sender, rx, format, connection_id);

    read_loop(&mut ws_receiver, &state, connection_id, format).await;

    // Always runs, logged in or not. Dropping the registry entry closes the
    // outbound channel, which ends the writer task.
    let session = state.sessions.write().await.disconnect(connection_id);
    tracing::info!(
        connection_id,
        room = ?session.and_then(|s| s.room),
        "Client disconnected"
    );
}

fn spawn_writer(
    mut ws_sender: futures::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<ServerEvent>,
    format: WireFormat,
    connection_id: ConnectionId,
) {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let message = match encode_server_event(&event, format) {
                Ok(Frame::Text(text)) => Message::Text(text.into()),
                Ok(Frame::Binary(data)) => Message::Binary(data.into()),
                Err(e) => {
                    tracing::warn!(connection_id, event = event.name(), error = %e, "Failed to encode event");
                    continue;
                },
            };
            if ws_sender.send(message).await.is_err() {
                break;
            }
        }
    });
}

async fn read_loop(
    ws_receiver: &mut futures::stream::SplitStream<WebSocket>,
    state: &AppState,
    connection_id: ConnectionId,
    format: WireFormat,
) {
    while let Some(Ok(msg)) = ws_receiver.next().await {
        let frame = match msg {
            Message::Text(text) => Frame::Text(text.as_str().to_owned()),
            Message::Binary(data) => Frame::Binary(data.to_vec()),
            Message::Close(_) => break,
            _ => continue,
        };

        let event = match decode_client_event(&frame, format) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(connection_id, error = %e, "Ignoring undecodable frame");
                continue;
            },
        };

        dispatch(state, connection_id, event).await;
    }
}

/// Route one client event. Events from a single connection are handled one
/// at a time, in arrival order.
async fn dispatch(state: &AppState, connection_id: ConnectionId, event: ClientEvent) {
    tracing::trace!(connection_id, event = event.name(), "Client event");
    match event {
        ClientEvent::Load(room) => {
            let sessions = state.sessions.read().await;
            sessions.query_room_size(connection_id, &room);
        },
        ClientEvent::Login(login) => {
            // Write lock spans the capacity check and the admission, so two
            // concurrent logins to one room are ordered.
            let outcome = state.sessions.write().await.login(connection_id, login);
            tracing::debug!(connection_id, ?outcome, "Login handled");
        },
        ClientEvent::Msg(message) => {
            let sessions = state.sessions.read().await;
            sessions.send_message(connection_id, message);
        },
    }
}
