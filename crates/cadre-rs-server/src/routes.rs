//! HTTP route handlers.

use crate::AppState;
use axum::Json;
use cadre_rs_core::CadreCoreError;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cadre_rs_protocol::{ErrorReply, InteractionId, MessageReply, MessageRequest};
use log::{error, info};
use serde_json::json;

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Accept a message, delegate it, and return the finalized record.
pub async fn submit_message(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Response {
    if request.message.trim().is_empty() {
        return error_reply(StatusCode::BAD_REQUEST, "message must not be empty");
    }

    match state.delegator.handle(request.message).await {
        Ok(record) => {
            info!(
                "message handled (interaction_id={}, status={})",
                record.id,
                record.status.as_str()
            );
            Json(MessageReply::success(record)).into_response()
        }
        Err(err) => {
            error!("message rejected: {err}");
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

/// Return the most recently updated interaction.
pub async fn latest_interaction(State(state): State<AppState>) -> Response {
    match state.delegator.latest_interaction() {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => error_reply(StatusCode::NOT_FOUND, "no interactions recorded yet"),
        Err(err) => {
            error!("latest interaction lookup failed: {err}");
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

/// List all interactions, most recently updated first.
pub async fn list_interactions(State(state): State<AppState>) -> Response {
    match state.delegator.list_interactions() {
        Ok(records) => Json(records).into_response(),
        Err(err) => {
            error!("interaction listing failed: {err}");
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

/// Fetch a single interaction by id.
pub async fn get_interaction(
    State(state): State<AppState>,
    Path(id): Path<InteractionId>,
) -> Response {
    match state.delegator.get_interaction(id) {
        Ok(record) => Json(record).into_response(),
        Err(CadreCoreError::UnknownInteraction(_)) => {
            error_reply(StatusCode::NOT_FOUND, "unknown interaction")
        }
        Err(err) => {
            error!("interaction lookup failed (interaction_id={id}): {err}");
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

/// Delete an interaction and its persisted state.
pub async fn delete_interaction(
    State(state): State<AppState>,
    Path(id): Path<InteractionId>,
) -> Response {
    match state.delegator.delete_interaction(id) {
        Ok(true) => Json(json!({ "deleted": id })).into_response(),
        Ok(false) => error_reply(StatusCode::NOT_FOUND, "unknown interaction"),
        Err(err) => {
            error!("interaction deletion failed (interaction_id={id}): {err}");
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

/// Build a JSON error response with the given status.
fn error_reply(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorReply {
            error: message.to_string(),
        }),
    )
        .into_response()
}
