//! HTTP transport: JSON API, chat endpoint and HTML views.

pub mod chat;
pub mod error;
pub mod issues;
pub mod pages;
pub mod users;

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::chat::intent::IntentParser;
use crate::chat::llm::LanguageModel;
use crate::chat::query::IssueQueryService;
use crate::chat::ChatService;
use crate::config::GlobalConfig;
use crate::persistence::db::Database;
use crate::{AppError, Result};

/// Shared application state accessible by all request handlers.
pub struct AppState {
    /// Global configuration.
    pub config: Arc<GlobalConfig>,
    /// `SQLite` connection pool.
    pub db: Arc<Database>,
    /// Chat pipeline.
    pub chat: ChatService,
}

impl AppState {
    /// Wire the chat pipeline over `db`. Patterns are compiled here, once.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a chat pattern fails to compile.
    pub fn new(
        config: Arc<GlobalConfig>,
        db: Arc<Database>,
        llm: Option<Arc<dyn LanguageModel>>,
    ) -> Result<Self> {
        let parser = Arc::new(IntentParser::new()?);
        let queries = IssueQueryService::new(Arc::clone(&db), config.chat.max_issues);
        let chat = ChatService::new(parser, queries, llm, config.chat.clone());
        Ok(Self { config, db, chat })
    }
}

/// Handler for `GET /health`.
async fn health() -> &'static str {
    "ok"
}

/// Build the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/calendar", get(pages::calendar))
        .route("/issue/new", get(pages::issue_form))
        .route("/issue/{id}/edit", get(pages::edit_issue_form))
        .route("/users/new", get(pages::user_form))
        .route("/issues", get(issues::list).post(issues::create))
        .route(
            "/issues/{id}",
            get(issues::get_one)
                .put(issues::update)
                .delete(issues::delete),
        )
        .route("/issues/{id}/status", patch(issues::update_status))
        .route("/users", get(users::list).post(users::create))
        .route("/api/users", get(users::list))
        .route("/users/{id}", axum::routing::delete(users::delete))
        .route("/chat", get(pages::chat).post(chat::chat))
        .route("/api/chatbot", post(chat::chat))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the configured `http_host:http_port`.
///
/// # Errors
///
/// Returns `AppError::Config` if the address cannot be bound.
pub async fn bind(config: &GlobalConfig) -> Result<TcpListener> {
    let addr = config.bind_addr();
    TcpListener::bind(&addr)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind HTTP on {addr}: {err}")))
}

/// Serve on an already-bound listener until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Io` if the server fails while running.
pub async fn serve_on(
    listener: TcpListener,
    state: Arc<AppState>,
    ct: CancellationToken,
) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "starting HTTP server");
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|err| AppError::Io(format!("HTTP server error: {err}")))?;

    info!("HTTP server shut down");
    Ok(())
}
