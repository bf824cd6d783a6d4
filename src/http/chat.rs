//! Chat endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::Result;

use super::error::JsonBody;
use super::AppState;

/// Body of `POST /chat`.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    /// Free-text question; absent and `null` count as empty.
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of a successful chat reply.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Reply text.
    pub message: String,
}

/// `POST /chat` and `POST /api/chatbot`
///
/// # Errors
///
/// Returns `AppError::Validation` for a malformed body or an empty or
/// overlong message.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let message = state.chat.reply(request.message.as_deref().unwrap_or_default()).await?;
    Ok(Json(ChatResponse { message }))
}
