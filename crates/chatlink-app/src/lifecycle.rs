//! 라이프사이클 관리.
//!
//! OS 시그널 대기와 종료 순서 조율: 감독자가 멈춘 뒤에 알림 관리자 등
//! 하위 태스크에 종료 신호를 보낸다.

use chatlink_relay::supervisor::{SupervisorHandle, SupervisorState};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// 라이프사이클 관리자
pub struct LifecycleManager {
    shutdown_tx: watch::Sender<bool>,
}

impl LifecycleManager {
    /// 새 라이프사이클 관리자 생성
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self { shutdown_tx }
    }

    /// 종료 수신기
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// OS 시그널 대기 (SIGINT, SIGTERM)
    pub async fn wait_for_signal() -> std::io::Result<()> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigint = signal(SignalKind::interrupt())?;
            let mut sigterm = signal(SignalKind::terminate())?;

            tokio::select! {
                _ = sigint.recv() => info!("SIGINT 수신"),
                _ = sigterm.recv() => info!("SIGTERM 수신"),
            }
        }

        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await?;
            info!("Ctrl+C 수신");
        }

        Ok(())
    }

    /// 감독자가 멈출 때까지 최대 `grace`만큼 기다린 뒤 종료 신호 발송
    ///
    /// 중지 명령은 호출자가 먼저 보낸다. 한 번도 시작하지 않은 감독자(`Idle`)는
    /// 기다리지 않는다. 반환값은 종료 신호 시점의 감독자 상태.
    pub async fn finish(&self, supervisor: &SupervisorHandle, grace: Duration) -> SupervisorState {
        let mut state_rx = supervisor.watch_state();
        let settled = tokio::time::timeout(
            grace,
            state_rx.wait_for(|state| {
                matches!(state, SupervisorState::Idle | SupervisorState::Stopped)
            }),
        )
        .await;
        if !matches!(settled, Ok(Ok(_))) {
            warn!("감독자 중지 대기 시간 초과 ({grace:?})");
        }

        info!("종료 신호 발송");
        self.shutdown_tx.send_replace(true);
        supervisor.state()
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification_manager::NotificationManager;
    use async_trait::async_trait;
    use chatlink_core::config::{NotificationConfig, ServerConfig};
    use chatlink_core::error::CoreError;
    use chatlink_core::models::notification::NotificationEvent;
    use chatlink_core::models::session::{Endpoint, SessionEnvelope, SessionEvent, SessionId};
    use chatlink_core::ports::notifier::NotificationSink;
    use chatlink_core::ports::transport::{SessionConnector, SessionHandle};
    use chatlink_relay::supervisor::ConnectionSupervisor;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    const GRACE: Duration = Duration::from_secs(1);

    /// 열자마자 `Opened`를 보고하는 연결기
    struct OpeningConnector;

    struct OpenHandle;

    impl SessionHandle for OpenHandle {
        fn send(&self, _text: &str) {}
        fn close(&self, _reason: &str) {}
        fn is_open(&self) -> bool {
            true
        }
    }

    impl SessionConnector for OpeningConnector {
        fn open(
            &self,
            _endpoint: &Endpoint,
            session_id: SessionId,
            events: mpsc::UnboundedSender<SessionEnvelope>,
        ) -> Box<dyn SessionHandle> {
            let _ = events.send(SessionEnvelope {
                session_id,
                event: SessionEvent::Opened,
            });
            Box::new(OpenHandle)
        }
    }

    /// 상태 제목만 기록하는 알림기
    #[derive(Default)]
    struct StatusRecorder {
        titles: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationSink for StatusRecorder {
        async fn show_message(&self, _event: &NotificationEvent) -> Result<(), CoreError> {
            Ok(())
        }

        async fn show_status(&self, title: &str, _body: &str) -> Result<(), CoreError> {
            self.titles.lock().push(title.to_string());
            Ok(())
        }

        async fn clear_status(&self) -> Result<(), CoreError> {
            Ok(())
        }
    }

    fn spawn_supervisor() -> (SupervisorHandle, chatlink_relay::supervisor::SupervisorOutputs) {
        ConnectionSupervisor::spawn(
            ServerConfig::default(),
            Duration::from_secs(5),
            Arc::new(OpeningConnector),
        )
    }

    #[tokio::test]
    async fn idle_supervisor_finishes_immediately() {
        let lm = LifecycleManager::new();
        let mut shutdown_rx = lm.subscribe();
        assert!(!*shutdown_rx.borrow());
        let (supervisor, _outputs) = spawn_supervisor();

        let state = lm.finish(&supervisor, GRACE).await;
        assert_eq!(state, SupervisorState::Idle);
        shutdown_rx.changed().await.unwrap();
        assert!(*shutdown_rx.borrow());
    }

    #[tokio::test]
    async fn shutdown_signal_follows_supervisor_stop() {
        let lm = LifecycleManager::new();
        let (supervisor, outputs) = spawn_supervisor();
        let recorder = Arc::new(StatusRecorder::default());
        let manager = NotificationManager::new(NotificationConfig::default(), recorder.clone());

        let task = {
            let shutdown_rx = lm.subscribe();
            tokio::spawn(async move { manager.run(outputs, shutdown_rx).await })
        };

        supervisor.start("10.0.2.2");
        let mut state_rx = supervisor.watch_state();
        state_rx
            .wait_for(|state| *state == SupervisorState::Connected)
            .await
            .unwrap();

        supervisor.stop();
        let state = lm.finish(&supervisor, GRACE).await;
        assert_eq!(state, SupervisorState::Stopped);
        task.await.unwrap();

        // 마지막 끊김 상태까지 알림된 뒤 종료
        assert_eq!(*recorder.titles.lock(), vec!["연결됨", "연결 끊김"]);
    }
}
