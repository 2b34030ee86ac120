//! 연결 감독자.
//!
//! 단일 태스크(액터)가 명령, 세션 이벤트, 타이머 만료를 하나의 큐처럼 순서대로
//! 처리한다. 상태 전이는 이 태스크 안에서만 일어나므로 `onClosed`와 타이머 만료가
//! 겹쳐도 세션이 두 개 생기지 않는다.
//!
//! | 상태 | 이벤트 | 동작 | 다음 상태 |
//! |---|---|---|---|
//! | Idle | start | 세션 열기 | Connecting |
//! | Connecting | Opened | Connected 알림 | Connected |
//! | Connecting | Closed/Error | 재연결 예약 | Reconnecting |
//! | Connected | Message | 분류 후 알림 (System 제외) | Connected |
//! | Connected | Closed/Error | Disconnected 알림, 재연결 예약 | Reconnecting |
//! | Reconnecting | 타이머 (running) | 세션 열기 | Connecting |
//! | Reconnecting | 타이머 (!running) | 무시 | Stopped |
//! | * | stop | 타이머 취소, 세션 종료 | Stopped |

use chatlink_core::classifier::classify;
use chatlink_core::config::ServerConfig;
use chatlink_core::models::notification::{NotificationEvent, NotificationIds, SessionStatus};
use chatlink_core::models::session::{Endpoint, SessionEnvelope, SessionEvent, SessionId};
use chatlink_core::ports::transport::{SessionConnector, SessionHandle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::scheduler::{ReconnectScheduler, TimerId};

/// 감독자 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// 시작 전
    Idle,
    /// 세션 연결 중
    Connecting,
    /// 연결됨
    Connected,
    /// 재연결 대기 중
    Reconnecting,
    /// 명시적으로 중지됨
    Stopped,
}

impl std::fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SupervisorState::Idle => write!(f, "Idle"),
            SupervisorState::Connecting => write!(f, "Connecting"),
            SupervisorState::Connected => write!(f, "Connected"),
            SupervisorState::Reconnecting => write!(f, "Reconnecting"),
            SupervisorState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// 감독자 명령
#[derive(Debug)]
enum Command {
    Start(String),
    Send(String),
    Stop,
}

/// 감독자 제어 핸들: 모든 호출은 즉시 반환된다
#[derive(Clone)]
pub struct SupervisorHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<SupervisorState>,
}

impl SupervisorHandle {
    /// 서버 주소로 연결 시작
    pub fn start(&self, address: &str) {
        self.command(Command::Start(address.to_string()));
    }

    /// 텍스트 전송 (연결 상태가 아니면 버려짐)
    pub fn send(&self, text: &str) {
        self.command(Command::Send(text.to_string()));
    }

    /// 중지: 재연결 예약 취소 + 세션 종료
    pub fn stop(&self) {
        self.command(Command::Stop);
    }

    /// 현재 상태
    pub fn state(&self) -> SupervisorState {
        *self.state_rx.borrow()
    }

    /// 상태 변경 수신기
    pub fn watch_state(&self) -> watch::Receiver<SupervisorState> {
        self.state_rx.clone()
    }

    fn command(&self, cmd: Command) {
        if self.cmd_tx.send(cmd).is_err() {
            debug!("감독자 종료됨, 명령 무시");
        }
    }
}

/// 감독자 출력 스트림
pub struct SupervisorOutputs {
    /// 세션 상태 변화
    pub status_rx: mpsc::UnboundedReceiver<SessionStatus>,
    /// 메시지 알림
    pub notification_rx: mpsc::UnboundedReceiver<NotificationEvent>,
}

/// 현재 세션 (최대 1개)
struct ActiveSession {
    id: SessionId,
    handle: Box<dyn SessionHandle>,
}

/// 연결 감독자 상태 머신
pub struct ConnectionSupervisor {
    server: ServerConfig,
    connector: Arc<dyn SessionConnector>,
    scheduler: ReconnectScheduler,
    state: SupervisorState,
    session: Option<ActiveSession>,
    address: Option<String>,
    endpoint: Option<Endpoint>,
    running: bool,
    next_session_id: SessionId,
    ids: NotificationIds,
    session_tx: mpsc::UnboundedSender<SessionEnvelope>,
    timer_tx: mpsc::UnboundedSender<TimerId>,
    status_tx: mpsc::UnboundedSender<SessionStatus>,
    notification_tx: mpsc::UnboundedSender<NotificationEvent>,
    state_tx: watch::Sender<SupervisorState>,
}

impl ConnectionSupervisor {
    /// 감독자 태스크를 띄우고 제어 핸들과 출력 스트림을 반환
    ///
    /// 모든 핸들이 drop되면 감독자는 중지 후 종료한다.
    pub fn spawn(
        server: ServerConfig,
        reconnect_delay: Duration,
        connector: Arc<dyn SessionConnector>,
    ) -> (SupervisorHandle, SupervisorOutputs) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (session_tx, session_rx) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        let (notification_tx, notification_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SupervisorState::Idle);

        let supervisor = Self {
            server,
            connector,
            scheduler: ReconnectScheduler::new(reconnect_delay),
            state: SupervisorState::Idle,
            session: None,
            address: None,
            endpoint: None,
            running: false,
            next_session_id: 0,
            ids: NotificationIds::new(),
            session_tx,
            timer_tx,
            status_tx,
            notification_tx,
            state_tx,
        };
        tokio::spawn(supervisor.run(cmd_rx, session_rx, timer_rx));

        (
            SupervisorHandle { cmd_tx, state_rx },
            SupervisorOutputs {
                status_rx,
                notification_rx,
            },
        )
    }

    /// 이벤트 루프: 모든 상태 전이는 여기서 직렬화된다
    async fn run(
        mut self,
        mut cmd_rx: mpsc::UnboundedReceiver<Command>,
        mut session_rx: mpsc::UnboundedReceiver<SessionEnvelope>,
        mut timer_rx: mpsc::UnboundedReceiver<TimerId>,
    ) {
        info!(
            "연결 감독자 시작: 재연결 지연={}ms",
            self.scheduler.delay().as_millis()
        );

        loop {
            tokio::select! {
                biased;
                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                Some(envelope) = session_rx.recv() => self.handle_session_event(envelope),
                Some(id) = timer_rx.recv() => self.handle_timer(id),
            }
        }

        self.stop();
        info!("연결 감독자 종료");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Start(address) => self.start(address),
            Command::Send(text) => self.send(&text),
            Command::Stop => self.stop(),
        }
    }

    fn start(&mut self, address: String) {
        let endpoint = match Endpoint::from_address(&address, &self.server) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                warn!("시작 요청 무시: {e}");
                return;
            }
        };

        let same_target = self.endpoint.as_ref() == Some(&endpoint);
        if same_target
            && matches!(
                self.state,
                SupervisorState::Connecting | SupervisorState::Connected
            )
        {
            debug!("이미 {} 상태, 중복 시작 무시", self.state);
            return;
        }

        self.running = true;
        self.scheduler.cancel_pending();
        if self.session.is_some() {
            info!("접속 대상 변경, 기존 세션 종료");
            let was_connected = self.state == SupervisorState::Connected;
            self.close_session("server changed");
            if was_connected {
                self.emit_status(SessionStatus::Disconnected);
            }
        }

        info!("연결 시작: {address}");
        self.address = Some(address);
        self.endpoint = Some(endpoint);
        self.open_session();
    }

    fn send(&self, text: &str) {
        match (&self.state, &self.session) {
            (SupervisorState::Connected, Some(session)) => session.handle.send(text),
            _ => debug!("미연결 상태({}), 전송 버림", self.state),
        }
    }

    fn stop(&mut self) {
        self.running = false;
        self.scheduler.cancel_pending();

        let was_connected = self.state == SupervisorState::Connected;
        self.close_session("client stop");
        if was_connected {
            self.emit_status(SessionStatus::Disconnected);
        }

        if self.state != SupervisorState::Stopped {
            info!("연결 감독자 중지 ({})", self.address.as_deref().unwrap_or("-"));
            self.set_state(SupervisorState::Stopped);
        }
    }

    fn open_session(&mut self) {
        let Some(endpoint) = self.endpoint.clone() else {
            warn!("접속 대상 없음, 세션 열기 생략");
            return;
        };

        self.next_session_id += 1;
        let id = self.next_session_id;
        info!("세션 #{id} 연결 시도: {endpoint}");

        let handle = self.connector.open(&endpoint, id, self.session_tx.clone());
        self.session = Some(ActiveSession { id, handle });
        self.set_state(SupervisorState::Connecting);
    }

    fn close_session(&mut self, reason: &str) {
        if let Some(session) = self.session.take() {
            debug!("세션 #{} 종료 요청: {reason}", session.id);
            session.handle.close(reason);
        }
    }

    fn handle_session_event(&mut self, envelope: SessionEnvelope) {
        let current = self.session.as_ref().map(|s| s.id);
        if !self.running || current != Some(envelope.session_id) {
            debug!(
                "이전 세션 #{} 이벤트 무시: {:?}",
                envelope.session_id, envelope.event
            );
            return;
        }

        match envelope.event {
            SessionEvent::Opened => self.on_opened(),
            SessionEvent::Message(text) => self.on_message(&text),
            SessionEvent::Closed { code, reason } => {
                info!("세션 #{} 종료: {code} {reason}", envelope.session_id);
                self.on_session_lost();
            }
            SessionEvent::Error(description) => {
                warn!("세션 #{} 오류: {description}", envelope.session_id);
                self.on_session_lost();
            }
        }
    }

    fn on_opened(&mut self) {
        if self.state != SupervisorState::Connecting {
            debug!("중복 Opened 무시 ({})", self.state);
            return;
        }
        info!("연결됨: {}", self.address.as_deref().unwrap_or("-"));
        self.set_state(SupervisorState::Connected);
        self.emit_status(SessionStatus::Connected);
    }

    fn on_message(&mut self, text: &str) {
        if self.state != SupervisorState::Connected {
            debug!("연결 전 메시지 무시 ({})", self.state);
            return;
        }

        let message = classify(text);
        let event = NotificationEvent::from_message(&message, self.ids.next_id());
        if event.suppress {
            debug!("시스템 메시지, 알림 생략");
            return;
        }

        debug!("알림 #{} ({:?}): {}", event.id, message.kind, event.title);
        if self.notification_tx.send(event).is_err() {
            debug!("알림 수신자 없음");
        }
    }

    fn on_session_lost(&mut self) {
        let was_connected = self.state == SupervisorState::Connected;
        // 종료 이벤트를 보낸 세션이므로 close 없이 해제
        self.session = None;
        if was_connected {
            self.emit_status(SessionStatus::Disconnected);
        }
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        self.set_state(SupervisorState::Reconnecting);
        self.emit_status(SessionStatus::Reconnecting);

        let timer_tx = self.timer_tx.clone();
        let id = self.scheduler.schedule(move |id| {
            let _ = timer_tx.send(id);
        });
        info!(
            "{}ms 후 재연결 ({:?})",
            self.scheduler.delay().as_millis(),
            id
        );
    }

    fn handle_timer(&mut self, id: TimerId) {
        if !self.scheduler.take_fired(id) {
            debug!("취소된 타이머 무시 {:?}", id);
            return;
        }
        if self.state != SupervisorState::Reconnecting {
            debug!("재연결 대기 상태 아님 ({}), 타이머 무시", self.state);
            return;
        }

        if self.running {
            info!("재연결 시도");
            self.open_session();
        } else {
            self.set_state(SupervisorState::Stopped);
        }
    }

    fn set_state(&mut self, state: SupervisorState) {
        if self.state != state {
            debug!("상태 전이: {} → {}", self.state, state);
        }
        self.state = state;
        self.state_tx.send_replace(state);
    }

    fn emit_status(&self, status: SessionStatus) {
        debug!("세션 상태: {status}");
        if self.status_tx.send(status).is_err() {
            debug!("상태 수신자 없음");
        }
    }
}
