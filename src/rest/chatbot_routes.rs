//! Help-chatbot endpoint: a thin, role-gated pass-through to the LLM proxy.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::chatbot::ChatMessage;
use crate::error::ApiError;
use crate::models::{Claims, Role};

use super::{ApiResponse, AppState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub conversation_history: Option<Vec<ChatMessage>>,
}

#[derive(Serialize)]
pub struct ChatReply {
    pub response: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatReply>>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ApiError::Validation("Message is required".to_string()));
    }
    if claims.role != Role::Tenant && claims.role != Role::Owner {
        return Err(ApiError::Forbidden(
            "Chatbot is only available for tenants and owners".to_string(),
        ));
    }

    let history = payload.conversation_history.unwrap_or_default();
    let response = state
        .chatbot
        .reply(&payload.message, claims.role, &history)
        .await;

    Ok(Json(ApiResponse::ok(
        "Response generated successfully",
        ChatReply { response },
    )))
}
