//! 실제 WebSocket 서버(axum)를 상대로 한 세션 통합 테스트.

use axum::extract::ws::{CloseFrame, Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chatlink_core::models::session::{Endpoint, SessionEnvelope, SessionEvent, CLOSE_NORMAL};
use chatlink_core::ports::transport::SessionConnector;
use chatlink_network::ws_session::WsConnector;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

const GREETING: &str = r#"{"username":"bob","text":"hi"}"#;

async fn echo_handler(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(echo)
}

async fn echo(mut socket: WebSocket) {
    if socket.send(WsMessage::Text(GREETING.into())).await.is_err() {
        return;
    }
    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            WsMessage::Text(text) => {
                if socket.send(WsMessage::Text(text)).await.is_err() {
                    break;
                }
            }
            WsMessage::Close(_) => break,
            _ => {}
        }
    }
}

async fn kick_handler(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(kick)
}

async fn kick(mut socket: WebSocket) {
    let frame = CloseFrame {
        code: 4000,
        reason: "kick".into(),
    };
    let _ = socket.send(WsMessage::Close(Some(frame))).await;
}

/// 에페메럴 포트에 테스트 서버 기동
async fn spawn_server() -> u16 {
    let app = Router::new()
        .route("/", get(echo_handler))
        .route("/kick", get(kick_handler));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    port
}

fn endpoint(port: u16, path: &str) -> Endpoint {
    Endpoint {
        host: "127.0.0.1".to_string(),
        port,
        secure: false,
        path: path.to_string(),
    }
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<SessionEnvelope>) -> Option<SessionEvent> {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .ok()
        .flatten()
        .map(|envelope| envelope.event)
}

#[tokio::test]
async fn open_receive_send_and_close() {
    let port = spawn_server().await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = WsConnector::new().open(&endpoint(port, "/"), 1, tx);

    assert_eq!(next_event(&mut rx).await, Some(SessionEvent::Opened));
    assert!(session.is_open());
    assert_eq!(
        next_event(&mut rx).await,
        Some(SessionEvent::Message(GREETING.to_string()))
    );

    session.send("ping");
    assert_eq!(
        next_event(&mut rx).await,
        Some(SessionEvent::Message("ping".to_string()))
    );

    session.close("bye");
    session.close("bye again");
    assert_eq!(
        next_event(&mut rx).await,
        Some(SessionEvent::Closed {
            code: CLOSE_NORMAL,
            reason: "bye".to_string()
        })
    );
    // 종료 이벤트 이후에는 아무것도 오지 않는다
    assert_eq!(next_event(&mut rx).await, None);
    assert!(!session.is_open());

    // 닫힌 세션으로의 전송은 조용히 버려진다
    session.send("after close");
}

#[tokio::test]
async fn server_initiated_close_reports_code_and_reason() {
    let port = spawn_server().await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _session = WsConnector::new().open(&endpoint(port, "/kick"), 2, tx);

    assert_eq!(next_event(&mut rx).await, Some(SessionEvent::Opened));
    assert_eq!(
        next_event(&mut rx).await,
        Some(SessionEvent::Closed {
            code: 4000,
            reason: "kick".to_string()
        })
    );
    assert_eq!(next_event(&mut rx).await, None);
}
