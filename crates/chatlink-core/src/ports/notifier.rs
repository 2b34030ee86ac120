//! 알림 싱크 포트.
//!
//! 구현: `chatlink-app` (notify-rust 데스크톱 알림, tracing 로그 알림)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::notification::NotificationEvent;

/// 알림 표시 인터페이스
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// 메시지 알림 표시 (이벤트마다 고유 ID)
    async fn show_message(&self, event: &NotificationEvent) -> Result<(), CoreError>;

    /// 상주 상태 알림 갱신 (제목 + 본문)
    async fn show_status(&self, title: &str, body: &str) -> Result<(), CoreError>;

    /// 상주 상태 알림 제거
    async fn clear_status(&self) -> Result<(), CoreError>;
}
