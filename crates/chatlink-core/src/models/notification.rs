//! 알림 이벤트 및 세션 상태 모델.

use serde::{Deserialize, Serialize};

use super::message::{ClassifiedMessage, MessageKind};

/// 파싱 불가 메시지의 알림 제목
const FALLBACK_TITLE: &str = "새 메시지";

/// 메시지 알림 이벤트: 알림 싱크가 정확히 한 번 소비한다
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// 고유 식별자 (시간 기반, 단조 증가)
    pub id: i64,
    /// 알림 제목
    pub title: String,
    /// 알림 본문
    pub body: String,
    /// 알림 억제 여부 (시스템 메시지)
    pub suppress: bool,
}

impl NotificationEvent {
    /// 분류된 메시지로부터 알림 생성
    pub fn from_message(message: &ClassifiedMessage, id: i64) -> Self {
        let title = match message.kind {
            MessageKind::Unparseable => FALLBACK_TITLE.to_string(),
            _ => format!("{}님의 새 메시지", message.sender),
        };

        Self {
            id,
            title,
            body: message.display_text.clone(),
            suppress: message.kind.is_suppressed(),
        }
    }
}

/// 세션 상태: 상태 알림 표시용
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// 연결됨
    Connected,
    /// 연결 끊김
    Disconnected,
    /// 재연결 대기 중
    Reconnecting,
}

impl SessionStatus {
    /// 상주 상태 알림 문구 (제목, 본문)
    pub fn status_text(self) -> (&'static str, &'static str) {
        match self {
            SessionStatus::Connected => ("연결됨", "메시지 대기 중..."),
            SessionStatus::Disconnected => ("연결 끊김", "재연결 시도 중..."),
            SessionStatus::Reconnecting => ("재연결 대기", "연결 상태를 확인하세요"),
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Connected => write!(f, "Connected"),
            SessionStatus::Disconnected => write!(f, "Disconnected"),
            SessionStatus::Reconnecting => write!(f, "Reconnecting"),
        }
    }
}

/// 알림 ID 생성기
///
/// 현재 시각(밀리초)을 쓰되, 같은 밀리초에 여러 개가 생성되면 이전 값 + 1.
#[derive(Debug, Default)]
pub struct NotificationIds {
    last: i64,
}

impl NotificationIds {
    /// 새 생성기
    pub fn new() -> Self {
        Self::default()
    }

    /// 다음 ID
    pub fn next_id(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last = now.max(self.last + 1);
        self.last
    }
}
