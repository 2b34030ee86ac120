//! 알림 싱크 어댑터.
//!
//! `NotificationSink` 포트 구현 두 가지:
//! - [`DesktopNotifier`]: notify-rust 데스크톱 알림
//! - [`LogNotifier`]: 헤드리스 환경용 tracing 출력

use async_trait::async_trait;
use chatlink_core::error::CoreError;
use chatlink_core::models::notification::NotificationEvent;
use chatlink_core::ports::notifier::NotificationSink;
use notify_rust::Notification;
use parking_lot::Mutex;
use tracing::{debug, info};

const APP_NAME: &str = "chatlink";

/// 데스크톱 알림 어댑터
pub struct DesktopNotifier;

impl DesktopNotifier {
    /// 새 알림 어댑터 생성
    pub fn new() -> Self {
        Self
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for DesktopNotifier {
    async fn show_message(&self, event: &NotificationEvent) -> Result<(), CoreError> {
        debug!("메시지 알림 #{}: {}", event.id, event.title);

        Notification::new()
            .summary(&event.title)
            .body(&event.body)
            .appname(APP_NAME)
            .show()
            .map_err(|e| CoreError::Internal(format!("알림 표시 실패: {e}")))?;

        Ok(())
    }

    async fn show_status(&self, title: &str, body: &str) -> Result<(), CoreError> {
        debug!("상태 알림: {title}");

        Notification::new()
            .summary(&format!("chatlink · {title}"))
            .body(body)
            .appname(APP_NAME)
            .show()
            .map_err(|e| CoreError::Internal(format!("상태 알림 표시 실패: {e}")))?;

        Ok(())
    }

    async fn clear_status(&self) -> Result<(), CoreError> {
        // 데스크톱 알림은 서버가 만료시킨다
        Ok(())
    }
}

/// 로그 기반 알림 어댑터
///
/// 같은 상태 문구가 연속으로 오면 한 번만 출력한다.
#[derive(Default)]
pub struct LogNotifier {
    status: Mutex<Option<(String, String)>>,
}

impl LogNotifier {
    /// 새 로그 알림 어댑터 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 현재 표시 중인 상태 (제목, 본문)
    #[cfg(test)]
    fn current_status(&self) -> Option<(String, String)> {
        self.status.lock().clone()
    }
}

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn show_message(&self, event: &NotificationEvent) -> Result<(), CoreError> {
        info!("🔔 [{}] {}: {}", event.id, event.title, event.body);
        Ok(())
    }

    async fn show_status(&self, title: &str, body: &str) -> Result<(), CoreError> {
        let next = (title.to_string(), body.to_string());
        let mut status = self.status.lock();
        if status.as_ref() != Some(&next) {
            info!("📡 {title}: {body}");
            *status = Some(next);
        }
        Ok(())
    }

    async fn clear_status(&self) -> Result<(), CoreError> {
        if self.status.lock().take().is_some() {
            debug!("상태 알림 제거");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_notifier_tracks_status() {
        let notifier = LogNotifier::new();
        assert!(notifier.current_status().is_none());

        notifier.show_status("연결됨", "메시지 대기 중...").await.unwrap();
        notifier.show_status("연결됨", "메시지 대기 중...").await.unwrap();
        assert_eq!(
            notifier.current_status(),
            Some(("연결됨".to_string(), "메시지 대기 중...".to_string()))
        );

        notifier.clear_status().await.unwrap();
        assert!(notifier.current_status().is_none());
    }

    #[tokio::test]
    async fn log_notifier_accepts_messages() {
        let notifier = LogNotifier::new();
        let event = NotificationEvent {
            id: 7,
            title: "bob님의 새 메시지".to_string(),
            body: "hi".to_string(),
            suppress: false,
        };
        assert!(notifier.show_message(&event).await.is_ok());
    }
}
