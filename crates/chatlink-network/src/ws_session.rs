//! WebSocket 세션.
//!
//! `tokio-tungstenite` 기반 단일 연결. 연결/수신/종료 결과를
//! [`SessionEnvelope`] 채널로 보고하며 재시도 로직은 없다.

use chatlink_core::models::session::{
    Endpoint, SessionEnvelope, SessionEvent, SessionId, CLOSE_ABNORMAL, CLOSE_NORMAL,
};
use chatlink_core::ports::transport::{SessionConnector, SessionHandle};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// close 프레임에 상태 코드가 없을 때
const CLOSE_NO_STATUS: u16 = 1005;

/// 세션 태스크로 전달되는 명령
#[derive(Debug)]
enum SessionCommand {
    Send(String),
    Close(String),
}

/// WebSocket 세션 생성기: `SessionConnector` 포트 구현
#[derive(Debug, Default, Clone)]
pub struct WsConnector;

impl WsConnector {
    /// 새 생성기
    pub fn new() -> Self {
        Self
    }
}

impl SessionConnector for WsConnector {
    fn open(
        &self,
        endpoint: &Endpoint,
        session_id: SessionId,
        events: mpsc::UnboundedSender<SessionEnvelope>,
    ) -> Box<dyn SessionHandle> {
        Box::new(WsSession::open(endpoint.url(), session_id, events))
    }
}

/// WebSocket 세션 핸들
///
/// 실제 소켓은 백그라운드 태스크가 소유하고, 핸들은 명령 채널만 가진다.
/// 핸들이 drop되면 태스크가 연결을 닫는다.
pub struct WsSession {
    session_id: SessionId,
    cmd_tx: mpsc::UnboundedSender<SessionCommand>,
    open: Arc<AtomicBool>,
    closing: AtomicBool,
}

impl WsSession {
    /// 연결 태스크를 시작하고 즉시 반환
    pub fn open(
        url: String,
        session_id: SessionId,
        events: mpsc::UnboundedSender<SessionEnvelope>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(false));
        let reporter = EventReporter { session_id, events };

        tokio::spawn(run_session(url, reporter, cmd_rx, open.clone()));

        Self {
            session_id,
            cmd_tx,
            open,
            closing: AtomicBool::new(false),
        }
    }
}

impl SessionHandle for WsSession {
    fn send(&self, text: &str) {
        if !self.is_open() || self.closing.load(Ordering::SeqCst) {
            debug!("세션 #{} 미연결, 전송 버림", self.session_id);
            return;
        }
        let _ = self.cmd_tx.send(SessionCommand::Send(text.to_string()));
    }

    fn close(&self, reason: &str) {
        if self.closing.swap(true, Ordering::SeqCst) {
            debug!("세션 #{} 이미 종료 요청됨", self.session_id);
            return;
        }
        let _ = self.cmd_tx.send(SessionCommand::Close(reason.to_string()));
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// 세션 ID를 붙여 소유자에게 이벤트 전달
struct EventReporter {
    session_id: SessionId,
    events: mpsc::UnboundedSender<SessionEnvelope>,
}

impl EventReporter {
    fn emit(&self, event: SessionEvent) {
        let envelope = SessionEnvelope {
            session_id: self.session_id,
            event,
        };
        if self.events.send(envelope).is_err() {
            debug!("세션 #{} 이벤트 수신자 없음", self.session_id);
        }
    }
}

/// 연결 중에 들어온 명령 처리: 전송은 버리고 종료 요청만 기다린다
async fn wait_for_close(cmd_rx: &mut mpsc::UnboundedReceiver<SessionCommand>) -> String {
    loop {
        match cmd_rx.recv().await {
            Some(SessionCommand::Close(reason)) => return reason,
            Some(SessionCommand::Send(_)) => debug!("연결 전 전송 요청 버림"),
            None => return "세션 핸들 해제".to_string(),
        }
    }
}

/// 세션 태스크: 연결 → 수신/송신 루프 → 종료 이벤트 1회
async fn run_session(
    url: String,
    reporter: EventReporter,
    mut cmd_rx: mpsc::UnboundedReceiver<SessionCommand>,
    open: Arc<AtomicBool>,
) {
    let session_id = reporter.session_id;
    info!("WebSocket 연결 #{session_id}: {url}");

    let ws_stream = tokio::select! {
        result = tokio_tungstenite::connect_async(url.as_str()) => match result {
            Ok((ws_stream, _)) => ws_stream,
            Err(e) => {
                warn!("WebSocket 연결 실패 #{session_id}: {e}");
                reporter.emit(SessionEvent::Error(format!("WebSocket 연결 실패: {e}")));
                return;
            }
        },
        reason = wait_for_close(&mut cmd_rx) => {
            debug!("연결 완료 전 종료 요청 #{session_id}");
            reporter.emit(SessionEvent::Closed { code: CLOSE_NORMAL, reason });
            return;
        }
    };

    open.store(true, Ordering::SeqCst);
    reporter.emit(SessionEvent::Opened);

    let (mut write, mut read) = ws_stream.split();

    let terminal = loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(SessionCommand::Send(text)) => {
                    if let Err(e) = write.send(Message::text(text)).await {
                        warn!("WebSocket 전송 실패 #{session_id}: {e}");
                        break SessionEvent::Error(format!("WebSocket 전송 실패: {e}"));
                    }
                }
                Some(SessionCommand::Close(reason)) => {
                    let frame = CloseFrame {
                        code: CloseCode::Normal,
                        reason: reason.clone().into(),
                    };
                    if let Err(e) = write.send(Message::Close(Some(frame))).await {
                        debug!("close 프레임 전송 실패 #{session_id}: {e}");
                    }
                    break SessionEvent::Closed { code: CLOSE_NORMAL, reason };
                }
                None => {
                    let _ = write.send(Message::Close(None)).await;
                    break SessionEvent::Closed {
                        code: CLOSE_NORMAL,
                        reason: "세션 핸들 해제".to_string(),
                    };
                }
            },
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    debug!("수신 #{session_id}: {} bytes", text.len());
                    reporter.emit(SessionEvent::Message(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(data))) => {
                    debug!("바이너리 프레임 무시 #{session_id}: {} bytes", data.len());
                }
                Some(Ok(Message::Close(frame))) => {
                    // 자동 응답 close 프레임 송출
                    let _ = write.flush().await;
                    let (code, reason) = frame
                        .map(|f| (u16::from(f.code), f.reason.as_str().to_owned()))
                        .unwrap_or((CLOSE_NO_STATUS, String::new()));
                    info!("서버가 연결 종료 #{session_id}: {code} {reason}");
                    break SessionEvent::Closed { code, reason };
                }
                Some(Ok(_)) => {} // Ping/Pong은 자동 처리
                Some(Err(e)) => {
                    warn!("WebSocket 수신 에러 #{session_id}: {e}");
                    break SessionEvent::Error(format!("WebSocket 수신 에러: {e}"));
                }
                None => {
                    break SessionEvent::Closed {
                        code: CLOSE_ABNORMAL,
                        reason: "연결 끊김".to_string(),
                    };
                }
            }
        }
    };

    open.store(false, Ordering::SeqCst);
    reporter.emit(terminal);
    debug!("WebSocket 세션 루프 종료 #{session_id}");
}
