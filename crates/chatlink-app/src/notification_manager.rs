//! 알림 관리자.
//!
//! 연결 감독자의 출력 채널을 단독 소비하여 설정에 따라 메시지/상태 알림을 발송한다.

use chatlink_core::config::NotificationConfig;
use chatlink_core::models::notification::{NotificationEvent, SessionStatus};
use chatlink_core::ports::notifier::NotificationSink;
use chatlink_relay::supervisor::SupervisorOutputs;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

/// 알림 관리자
pub struct NotificationManager {
    config: RwLock<NotificationConfig>,
    notifier: Arc<dyn NotificationSink>,
}

impl NotificationManager {
    /// 새 알림 관리자 생성
    pub fn new(config: NotificationConfig, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            config: RwLock::new(config),
            notifier,
        }
    }

    /// 메시지 알림 발송 (억제 대상은 건너뜀)
    pub async fn notify_message(&self, event: &NotificationEvent) {
        let config = self.config.read().await;
        if !config.enabled || event.suppress {
            return;
        }

        if let Err(e) = self.notifier.show_message(event).await {
            debug!("메시지 알림 실패: {e}");
        }
    }

    /// 상주 상태 알림 갱신
    pub async fn notify_status(&self, status: SessionStatus) {
        let config = self.config.read().await;
        if !config.enabled || !config.status_notifications {
            return;
        }

        let (title, body) = status.status_text();
        if let Err(e) = self.notifier.show_status(title, body).await {
            debug!("상태 알림 실패: {e}");
        }
    }

    /// 상주 상태 알림 제거
    pub async fn clear_status(&self) {
        if let Err(e) = self.notifier.clear_status().await {
            debug!("상태 알림 제거 실패: {e}");
        }
    }

    /// 종료 신호까지 감독자 출력 소비
    ///
    /// 대기 중인 상태/메시지를 모두 처리한 뒤에야 종료 신호를 본다.
    pub async fn run(&self, mut outputs: SupervisorOutputs, mut shutdown_rx: watch::Receiver<bool>) {
        info!("알림 관리자 시작");
        loop {
            tokio::select! {
                biased;

                Some(status) = outputs.status_rx.recv() => self.notify_status(status).await,
                Some(event) = outputs.notification_rx.recv() => self.notify_message(&event).await,
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        self.clear_status().await;
        info!("알림 관리자 종료");
    }
}
