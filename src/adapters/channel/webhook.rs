//! Inbound transport. Axum router for the channel webhook, its socket variant
//! and a health probe.
//!
//! This is the outermost turn boundary: a failed turn is logged and answered
//! with the fixed error text. It never takes the service down.

use crate::adapters::channel::activity::{Activity, activity_to_turn, reply_activity};
use crate::domain::Turn;
use crate::ports::{ReplyPort, TurnHandler};
use crate::shared::messages::ERROR_MESSAGE;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

pub const MESSAGES_PATH: &str = "/api/messages";
pub const HEALTH_PATH: &str = "/health";

/// Which optional collaborators are wired in. Reported by the health route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub recognizer: bool,
    pub knowledge_base: bool,
    pub authenticated_channel: bool,
}

#[derive(Clone)]
pub struct WebhookState {
    handler: Arc<dyn TurnHandler>,
    replies: Arc<dyn ReplyPort>,
    capabilities: Capabilities,
}

impl WebhookState {
    pub fn new(
        handler: Arc<dyn TurnHandler>,
        replies: Arc<dyn ReplyPort>,
        capabilities: Capabilities,
    ) -> Self {
        Self {
            handler,
            replies,
            capabilities,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub capabilities: Capabilities,
}

pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route(MESSAGES_PATH, post(messages).get(socket))
        .route(HEALTH_PATH, get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the handler for one turn. Any failure becomes the fixed error reply.
async fn replies_for(handler: &dyn TurnHandler, turn: &Turn) -> Vec<String> {
    match handler.on_turn(turn).await {
        Ok(replies) => replies,
        Err(e) => {
            error!(error = %e, conversation = %turn.conversation.id, "turn failed");
            vec![ERROR_MESSAGE.to_string()]
        }
    }
}

/// POST webhook: process the activity, deliver replies through the connector.
pub async fn messages(State(state): State<WebhookState>, Json(activity): Json<Activity>) -> StatusCode {
    let turn = activity_to_turn(&activity);
    debug!(kind = ?turn.kind, conversation = %turn.conversation.id, "activity received");

    for reply in replies_for(state.handler.as_ref(), &turn).await {
        if let Err(e) = state.replies.send_text(&turn, &reply).await {
            error!(error = %e, conversation = %turn.conversation.id, "reply delivery failed");
            if let Err(e) = state.replies.send_text(&turn, ERROR_MESSAGE).await {
                warn!(error = %e, "error reply could not be delivered");
            }
            return StatusCode::BAD_GATEWAY;
        }
    }
    StatusCode::OK
}

/// GET upgrade: same activities over a socket, replies written back on it.
pub async fn socket(State(state): State<WebhookState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: WebhookState) {
    info!("socket connected");
    while let Some(frame) = socket.recv().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "socket receive failed");
                break;
            }
        };

        let activity: Activity = match serde_json::from_str(text.as_str()) {
            Ok(a) => a,
            Err(e) => {
                warn!(error = %e, "ignoring malformed activity frame");
                continue;
            }
        };
        let turn = activity_to_turn(&activity);

        for reply in replies_for(state.handler.as_ref(), &turn).await {
            let frame = match serde_json::to_string(&reply_activity(&turn, &reply)) {
                Ok(json) => json,
                Err(e) => {
                    error!(error = %e, "failed to encode reply");
                    continue;
                }
            };
            if socket.send(Message::Text(frame.into())).await.is_err() {
                debug!("socket closed while replying");
                return;
            }
        }
    }
    info!("socket disconnected");
}

pub async fn health(State(state): State<WebhookState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        capabilities: state.capabilities,
    })
}
