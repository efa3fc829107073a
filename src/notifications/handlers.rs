// WebSocket endpoint of the notification hub

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::auth::{middleware::authenticate, policy, AuthError, AuthenticatedUser, Role};
use crate::error::ApiError;
use crate::notifications::{
    hub::{facility_group, ConnectionId, NotificationHub},
    models::{ClientMessage, ServerMessage},
};
use crate::AppState;

/// Browsers cannot set headers on a WebSocket handshake, so the token rides in the query
#[derive(Debug, Deserialize)]
pub struct HubQuery {
    pub access_token: Option<String>,
}

/// Handler for GET /hubs/notifications
pub async fn notifications_hub(
    State(state): State<AppState>,
    Query(query): Query<HubQuery>,
    ws: Option<WebSocketUpgrade>,
) -> Result<Response, ApiError> {
    let token = query
        .access_token
        .filter(|t| !t.trim().is_empty())
        .ok_or(AuthError::MissingToken)?;
    let user = authenticate(&state.token_service, token.trim())?;

    let ws = ws.ok_or_else(|| ApiError::bad_request("Yêu cầu phải là kết nối WebSocket"))?;

    tracing::info!("Hub connection accepted for user {} ({})", user.user_id, user.role);
    Ok(ws
        .on_upgrade(move |socket| handle_socket(socket, state, user))
        .into_response())
}

async fn handle_socket(socket: WebSocket, state: AppState, user: AuthenticatedUser) {
    let hub = state.hub.clone();
    let (connection_id, mut outgoing) = hub.register(&user).await;
    let (mut sender, mut receiver) = socket.split();

    // Writer task: drain this connection's channel into the socket
    let writer = tokio::spawn(async move {
        while let Some(message) = outgoing.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize hub message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = receiver.next().await {
        match message {
            Message::Text(text) => {
                let reply = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_message) => {
                        handle_client_message(&state, &hub, connection_id, &user, client_message)
                            .await
                    }
                    Err(_) => {
                        tracing::debug!("Unparseable hub message from user {}", user.user_id);
                        Some(ServerMessage::error("Tin nhắn không hợp lệ"))
                    }
                };
                if let Some(reply) = reply {
                    hub.send_to_connection(connection_id, reply).await;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    hub.unregister(connection_id).await;
    writer.abort();
    tracing::info!("Hub connection closed for user {}", user.user_id);
}

/// Apply one client message; returns the direct reply, if any
async fn handle_client_message(
    state: &AppState,
    hub: &Arc<NotificationHub>,
    connection_id: ConnectionId,
    user: &AuthenticatedUser,
    message: ClientMessage,
) -> Option<ServerMessage> {
    match message {
        ClientMessage::Ping => Some(ServerMessage::pong()),
        ClientMessage::JoinFacility { facility_id } => {
            match may_join_facility(state, user, facility_id).await {
                Ok(true) => {
                    hub.join_group(connection_id, facility_group(facility_id)).await;
                    tracing::debug!("User {} joined facility {}", user.user_id, facility_id);
                    None
                }
                Ok(false) => Some(ServerMessage::error(
                    "Bạn không có quyền theo dõi cơ sở này",
                )),
                Err(e) => {
                    tracing::error!("Facility lookup failed for hub join: {}", e);
                    Some(ServerMessage::error("Đã xảy ra lỗi hệ thống"))
                }
            }
        }
        ClientMessage::LeaveFacility { facility_id } => {
            hub.leave_group(connection_id, &facility_group(facility_id)).await;
            None
        }
    }
}

async fn may_join_facility(
    state: &AppState,
    user: &AuthenticatedUser,
    facility_id: i32,
) -> Result<bool, sqlx::Error> {
    match user.role {
        Role::Admin => Ok(true),
        Role::Staff => Ok(user.facility_id == Some(facility_id)),
        Role::Customer => Ok(false),
        Role::Owner => Ok(state
            .facility_service
            .repository()
            .find_owner(facility_id)
            .await?
            .map(|owner_id| policy::can_manage_facility(user, owner_id))
            .unwrap_or(false)),
    }
}
