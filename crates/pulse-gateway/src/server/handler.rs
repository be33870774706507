//! WebSocket handler
//!
//! Upgrades connections, verifies the credential before anything touches
//! the presence registry, and drives the per-connection session.

use axum::{
    extract::{ws::Message, Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use pulse_common::auth::Identity;

use crate::presence::Connection;
use crate::protocol::{CloseCode, ServerEvent};
use crate::server::GatewayState;
use crate::session::{decode_frame, ConversationSession, SessionError};

/// Connection query parameters
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    #[serde(default)]
    token: Option<String>,
}

/// WebSocket gateway handler
///
/// The credential travels as a `token` query parameter and is verified
/// before the upgrade completes; a failed verification never reaches
/// the registry.
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    Query(params): Query<ConnectParams>,
    ws: WebSocketUpgrade,
) -> Response {
    let credential = params.token.unwrap_or_default();

    let identity = match state.service_context().verifier().verify(&credential) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::debug!(error = %e, "Connection rejected before upgrade");
            let status = if e.is_authentication_failure() {
                StatusCode::UNAUTHORIZED
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            return status.into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(state, socket, identity))
        .into_response()
}

/// Handle an upgraded, authenticated WebSocket connection
async fn handle_socket(
    state: GatewayState,
    socket: axum::extract::ws::WebSocket,
    identity: Identity,
) {
    let session_id = Uuid::new_v4().to_string();

    // Bounded channel to the socket writer; pushes beyond it are dropped
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(state.config().realtime.push_buffer);

    let connection = Connection::new(
        session_id.clone(),
        identity.user_id,
        identity.username,
        tx,
    );

    tracing::info!(
        session_id = %session_id,
        user_id = %identity.user_id,
        "WebSocket connection established"
    );

    let mut session = ConversationSession::new(
        connection.clone(),
        state.registry().clone(),
        state.typing().clone(),
        state.service_context().clone(),
    );
    session.activate();

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Writer task: drains the connection channel into the socket
    let session_id_send = session_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if ws_sink.send(Message::Text(json.into())).await.is_err() {
                        tracing::debug!(
                            session_id = %session_id_send,
                            "Socket write failed, stopping writer"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %session_id_send,
                        error = %e,
                        "Failed to encode outbound event"
                    );
                }
            }
        }

        let _ = ws_sink.close().await;
    });

    // Reader loop: frames are processed one at a time, in arrival order
    while let Some(msg) = ws_stream.next().await {
        match msg {
            Ok(Message::Text(text)) => match decode_frame(&text) {
                Ok(event) => session.handle_event(event).await,
                Err(e) => {
                    tracing::debug!(
                        session_id = %session_id,
                        error = %e,
                        close_code = %e.to_close_code(),
                        "Undecodable frame, closing connection"
                    );
                    break;
                }
            },
            Ok(Message::Binary(_)) => {
                let e = SessionError::InvalidPayload("binary frames are not supported".to_string());
                tracing::debug!(
                    session_id = %session_id,
                    error = %e,
                    close_code = %e.to_close_code(),
                    "Closing connection"
                );
                break;
            }
            Ok(Message::Ping(_) | Message::Pong(_)) => {
                // Pong replies are handled by axum
            }
            Ok(Message::Close(_)) => {
                tracing::info!(session_id = %session_id, "Client closed connection");
                break;
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %session_id,
                    error = %e,
                    close_code = %CloseCode::UnknownError,
                    "WebSocket error"
                );
                break;
            }
        }
    }

    session.close();

    // Dropping the last sender ends the writer task
    drop(session);
    drop(connection);
    let _ = send_task.await;
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}
