mod auth;
pub mod config;
mod pages;
pub mod relay;

pub use auth::{Authenticator, SessionStore, SqliteAuthenticator};
pub use config::Config;
pub use relay::messages;

use axum::{
    Router,
    extract::{Path, Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use pages::TokenQuery;
use relay::{ConnectionSettings, MatchRegistry, MessageRouter};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

async fn health() -> &'static str {
    "ok"
}

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<MessageRouter>,
    pub auth: Arc<dyn Authenticator>,
    pub sessions: Arc<SessionStore>,
    pub settings: ConnectionSettings,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self::with_authenticator(Arc::new(SqliteAuthenticator::new(pool)), config)
    }

    pub fn with_authenticator(auth: Arc<dyn Authenticator>, config: &Config) -> Self {
        let registry = Arc::new(MatchRegistry::new());
        Self {
            router: Arc::new(MessageRouter::new(registry)),
            auth,
            sessions: Arc::new(SessionStore::with_ttl(config.session_ttl)),
            settings: config.connection_settings(),
        }
    }

    pub fn registry(&self) -> &Arc<MatchRegistry> {
        self.router.registry()
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(match_id): Path<String>,
    Query(query): Query<TokenQuery>,
    State(state): State<AppState>,
) -> Response {
    let Some(nickname) = state.session_user(&query) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    info!(match_id, nickname, "Upgrading relay connection");
    ws.on_upgrade(move |socket| {
        relay::run_connection(socket, match_id, state.router, state.settings)
    })
}

pub fn app(pool: SqlitePool) -> Router {
    app_with_state(AppState::new(pool, &Config::default()))
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(pages::login_page))
        .route("/login", post(pages::login))
        .route("/dashboard", get(pages::dashboard))
        .route("/criar", get(pages::create_match))
        .route("/partida/:match_id", get(pages::match_page))
        .route("/camera/:match_id", get(pages::camera_page))
        .route("/ws/:match_id", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
