#![allow(dead_code)]

use futures_util::StreamExt;
use match_relay::messages::{ClientMessage, ServerMessage};
use match_relay::relay::state::MatchSnapshot;
use match_relay::{AppState, Config};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

pub struct TestServer {
    base_url: String,
    pub state: AppState,
}

impl TestServer {
    pub fn ws_url(&self, match_id: &str, token: &str) -> String {
        format!("{}/ws/{}?token={}", self.base_url, match_id, token)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!(
            "http://{}{}",
            self.base_url.strip_prefix("ws://").unwrap(),
            path
        )
    }

    /// Log `nickname` in and open a relay socket for `match_id`
    pub async fn connect(&self, match_id: &str, nickname: &str) -> WsStream {
        let token = self.state.sessions.issue(nickname);
        let (ws, _) = connect_async(&self.ws_url(match_id, &token))
            .await
            .expect("Failed to connect");
        ws
    }
}

pub async fn spawn_test_server() -> TestServer {
    spawn_test_server_with_config(Config::default()).await
}

pub async fn spawn_test_server_with_config(config: Config) -> TestServer {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();

    let state = AppState::new(pool, &config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = match_relay::app_with_state(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("ws://{}", addr),
        state,
    }
}

pub fn join_msg(nickname: &str) -> Message {
    let json = serde_json::to_string(&ClientMessage::Join {
        nickname: nickname.to_string(),
    })
    .unwrap();
    Message::Text(json.into())
}

pub fn pass_turn_msg() -> Message {
    let json = serde_json::to_string(&ClientMessage::PassTurn).unwrap();
    Message::Text(json.into())
}

pub fn raw_msg(json: &str) -> Message {
    Message::Text(json.to_string().into())
}

pub async fn recv_text(ws: &mut WsStream) -> String {
    let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("Timed out waiting for message")
        .unwrap()
        .unwrap();
    msg.to_text().unwrap().to_string()
}

pub async fn recv(ws: &mut WsStream) -> ServerMessage {
    serde_json::from_str(&recv_text(ws).await).unwrap()
}

pub async fn recv_participants(ws: &mut WsStream) -> Vec<String> {
    match recv(ws).await {
        ServerMessage::Participants { users } => users,
        other => panic!("Expected Participants, got {:?}", other),
    }
}

pub async fn recv_estado(ws: &mut WsStream) -> MatchSnapshot {
    match recv(ws).await {
        ServerMessage::Estado { estado } => estado,
        other => panic!("Expected Estado, got {:?}", other),
    }
}

/// Assert nothing arrives within a short window
pub async fn assert_silent(ws: &mut WsStream) {
    let next = tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(next.is_err(), "Expected no message, got {:?}", next);
}

/// Join and consume the resulting `participants` + `estado` pair
pub async fn join(ws: &mut WsStream, nickname: &str) -> (Vec<String>, MatchSnapshot) {
    use futures_util::SinkExt;
    ws.send(join_msg(nickname)).await.unwrap();
    let users = recv_participants(ws).await;
    let estado = recv_estado(ws).await;
    (users, estado)
}
