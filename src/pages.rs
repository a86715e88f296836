//! Thin HTTP surface around the relay: login, dashboard, match creation and
//! the match and camera views. Rendering is left to the client; these return
//! only what a page needs.

use crate::AppState;
use crate::relay::new_unique_match_id;
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const LOGIN_ERROR: &str = "Nickname ou senha inválidos";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub nickname: String,
    pub senha: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub nickname: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginPage {
    error: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct DashboardView {
    user: String,
}

#[derive(Debug, Serialize)]
struct MatchView {
    partida_id: String,
    user: String,
}

/// The camera view joins a match from a second device, so it carries no user
#[derive(Debug, Serialize)]
struct CameraView {
    partida_id: String,
}

impl AppState {
    /// Nickname behind the query's session token, if any
    pub(crate) fn session_user(&self, query: &TokenQuery) -> Option<String> {
        query
            .token
            .as_deref()
            .and_then(|token| self.sessions.nickname_for(token))
    }
}

pub async fn login_page() -> Response {
    Json(LoginPage { error: None }).into_response()
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if !state.auth.verify(&form.nickname, &form.senha).await {
        warn!(nickname = form.nickname, "Login rejected");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody { error: LOGIN_ERROR }),
        )
            .into_response();
    }

    let token = state.sessions.issue(&form.nickname);
    Json(LoginResponse {
        token,
        nickname: form.nickname,
    })
    .into_response()
}

pub async fn dashboard(State(state): State<AppState>, Query(query): Query<TokenQuery>) -> Response {
    let Some(user) = state.session_user(&query) else {
        return Redirect::to("/").into_response();
    };
    Json(DashboardView { user }).into_response()
}

/// Allocate a match and send the creator to its page
pub async fn create_match(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let (Some(user), Some(token)) = (state.session_user(&query), query.token.as_deref()) else {
        return Redirect::to("/").into_response();
    };

    let registry = state.router.registry();
    let match_id = new_unique_match_id(|id| registry.contains(id));
    info!(match_id, user, "Match created");

    Redirect::to(&format!("/partida/{match_id}?token={token}")).into_response()
}

pub async fn match_page(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Response {
    let Some(user) = state.session_user(&query) else {
        return Redirect::to("/").into_response();
    };
    Json(MatchView {
        partida_id: match_id,
        user,
    })
    .into_response()
}

pub async fn camera_page(Path(match_id): Path<String>) -> Response {
    Json(CameraView {
        partida_id: match_id,
    })
    .into_response()
}
