//! JSON API handlers.
//!
//! Endpoints:
//! - GET  /api/v1/sessions/{id} - Transcript of a chat session
//! - POST /api/v1/ask           - One-off question, answered outside any session

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use uuid::Uuid;

use heavylifter_core::chain::SqlAnswer;
use heavylifter_core::sql::SqlDatabase;
use heavylifter_types::chat::{ChatPage, Transcript};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for a one-off question.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    /// Which chain answers the question. Defaults to the SQL page.
    #[serde(default)]
    pub page: Option<ChatPage>,
}

/// GET /api/v1/sessions/{id} - Get a session's transcript.
pub async fn get_session<D: SqlDatabase + 'static>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Transcript>>, AppError> {
    let start = Instant::now();
    let id: Uuid = id
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {id}")))?;

    let transcript = state
        .chat
        .sessions()
        .get(&id)
        .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        transcript,
        Uuid::now_v7().to_string(),
        elapsed,
    )))
}

/// POST /api/v1/ask - Answer a question without recording it.
pub async fn ask<D: SqlDatabase + 'static>(
    State(state): State<AppState<D>>,
    Json(body): Json<AskRequest>,
) -> Result<Json<ApiResponse<SqlAnswer>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();
    let question = body.question.trim();
    if question.is_empty() {
        return Err(AppError::Validation("Question must not be empty".to_string()));
    }
    let page = body.page.unwrap_or(ChatPage::Lifter);

    tracing::info!(request_id = %request_id, page = %page, "API question received");
    let answer = state.chat.ask_once(page, question).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(answer, request_id, elapsed)))
}
