//! Server-rendered chat pages.
//!
//! Endpoints:
//! - GET  /                   - Home page
//! - GET  /{page}             - Start a session and redirect to it
//! - GET  /{page}/{id}        - Render the transcript
//! - POST /{page}/{id}        - Answer a prompt, then redirect back

use askama::Template;
use axum::extract::{Path, State};
use axum::response::{Html, Redirect};
use axum::Form;
use serde::Deserialize;
use uuid::Uuid;

use heavylifter_core::sql::SqlDatabase;
use heavylifter_types::chat::{ChatPage, Transcript};

use crate::http::error::{AppError, PageError};
use crate::http::views::{ChatTemplate, HomeTemplate, MessageView, nav_links};
use crate::state::AppState;

/// Form body of the chat input.
#[derive(Debug, Deserialize)]
pub struct PromptForm {
    #[serde(default)]
    pub prompt: String,
}

fn parse_page(page: &str) -> Result<ChatPage, AppError> {
    page.parse()
        .map_err(|_| AppError::NotFound(format!("No page named '{page}'")))
}

fn parse_session_id(id: &str) -> Result<Uuid, AppError> {
    id.parse()
        .map_err(|_| AppError::NotFound("Session not found".to_string()))
}

fn render(template: impl Template) -> Result<Html<String>, PageError> {
    template
        .render()
        .map(Html)
        .map_err(|e| PageError(AppError::Internal(format!("template error: {e}"))))
}

fn session_path(page: ChatPage, id: &Uuid) -> String {
    format!("{}/{id}", page.path())
}

/// GET / - Home page.
pub async fn home<D: SqlDatabase + 'static>(
    State(state): State<AppState<D>>,
) -> Result<Html<String>, PageError> {
    render(HomeTemplate {
        nav: nav_links(None),
        graphql_enabled: state.chat.is_available(ChatPage::Graphql),
    })
}

/// GET /{page} - Start a fresh session on a chat page.
pub async fn start_session<D: SqlDatabase + 'static>(
    State(state): State<AppState<D>>,
    Path(page): Path<String>,
) -> Result<Redirect, PageError> {
    let page = parse_page(&page)?;
    let transcript = state.chat.start(page)?;
    Ok(Redirect::to(&session_path(page, &transcript.id)))
}

/// GET /{page}/{id} - Render a session's transcript.
pub async fn show_session<D: SqlDatabase + 'static>(
    State(state): State<AppState<D>>,
    Path((page, id)): Path<(String, String)>,
) -> Result<Html<String>, PageError> {
    let page = parse_page(&page)?;
    let id = parse_session_id(&id)?;
    let transcript = state
        .chat
        .transcript(&id, page)
        .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

    render(chat_template(page, &transcript))
}

/// POST /{page}/{id} - Run the page's chain for the submitted prompt.
///
/// On success redirects (303) back to the transcript; on failure renders an
/// error page and the transcript stays as it was.
pub async fn submit_prompt<D: SqlDatabase + 'static>(
    State(state): State<AppState<D>>,
    Path((page, id)): Path<(String, String)>,
    Form(form): Form<PromptForm>,
) -> Result<Redirect, PageError> {
    let page = parse_page(&page)?;
    let id = parse_session_id(&id)?;
    let prompt = form.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::Validation("Prompt must not be empty".to_string()).into());
    }

    tracing::info!(session_id = %id, page = %page, "Chat prompt received");
    state.chat.ask(&id, page, prompt).await?;
    Ok(Redirect::to(&session_path(page, &id)))
}

fn chat_template(page: ChatPage, transcript: &Transcript) -> ChatTemplate {
    ChatTemplate {
        nav: nav_links(Some(page)),
        title: page.title(),
        action: session_path(page, &transcript.id),
        messages: transcript.turns().iter().map(MessageView::from).collect(),
    }
}
