mod common;

use common::*;
use futures_util::SinkExt;
use match_relay::messages::ServerMessage;
use tokio_tungstenite::connect_async;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

async fn login(server: &TestServer, nickname: &str, senha: &str) -> reqwest::Response {
    client()
        .post(server.http_url("/login"))
        .form(&[("nickname", nickname), ("senha", senha)])
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn login_with_valid_credentials_issues_token() {
    let server = spawn_test_server().await;

    let response = login(&server, "player1", "senha123").await;
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["nickname"], "player1");
    let token = body["token"].as_str().unwrap();
    assert_eq!(
        server.state.sessions.nickname_for(token).as_deref(),
        Some("player1")
    );
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let server = spawn_test_server().await;

    let response = login(&server, "player1", "abc123").await;
    assert_eq!(response.status(), 401);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Nickname ou senha inválidos");
}

#[tokio::test]
async fn dashboard_shows_logged_in_user() {
    let server = spawn_test_server().await;
    let body: serde_json::Value = login(&server, "player2", "abc123").await.json().await.unwrap();
    let token = body["token"].as_str().unwrap();

    let response = client()
        .get(server.http_url(&format!("/dashboard?token={token}")))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"], "player2");
}

#[tokio::test]
async fn created_match_is_playable_end_to_end() {
    let server = spawn_test_server().await;
    let body: serde_json::Value = login(&server, "player1", "senha123").await.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    // /criar redirects to the new match page
    let response = client()
        .get(server.http_url(&format!("/criar?token={token}")))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_redirection());
    let location = response.headers()["location"].to_str().unwrap().to_string();

    let page: serde_json::Value = client()
        .get(server.http_url(&location))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["user"], "player1");
    let match_id = page["partida_id"].as_str().unwrap();

    // The page's match id and token open a relay socket
    let (mut ws, _) = connect_async(&server.ws_url(match_id, &token)).await.unwrap();
    ws.send(join_msg("player1")).await.unwrap();
    assert_eq!(
        recv(&mut ws).await,
        ServerMessage::Participants {
            users: vec!["player1".to_string()]
        }
    );
}

#[tokio::test]
async fn camera_page_needs_no_login() {
    let server = spawn_test_server().await;

    let response = client()
        .get(server.http_url("/camera/m1"))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["partida_id"], "m1");
}

#[tokio::test]
async fn expired_session_is_sent_back_to_login() {
    let config = match_relay::Config {
        session_ttl: std::time::Duration::ZERO,
        ..Default::default()
    };
    let server = spawn_test_server_with_config(config).await;
    let body: serde_json::Value = login(&server, "player1", "senha123").await.json().await.unwrap();
    let token = body["token"].as_str().unwrap();

    let response = client()
        .get(server.http_url(&format!("/dashboard?token={token}")))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 303);
    assert_eq!(response.headers()["location"], "/");
}
