//! 수신 메시지 분류 모델.

use serde::{Deserialize, Serialize};

/// 메시지 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// 시스템/제어 메시지: 알림 억제
    System,
    /// 일반 텍스트
    UserText,
    /// 파일 첨부
    UserFile,
    /// 음성 메시지
    UserAudio,
    /// 암호화된 메시지: 본문 노출 금지
    UserEncrypted,
    /// 구조화 파싱 실패
    Unparseable,
}

impl MessageKind {
    /// 알림을 억제해야 하는 종류인지
    pub fn is_suppressed(self) -> bool {
        matches!(self, MessageKind::System)
    }
}

/// 분류된 수신 메시지 (페이로드 1개당 1개, 불변)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedMessage {
    /// 메시지 종류
    pub kind: MessageKind,
    /// 발신자 표시 이름
    pub sender: String,
    /// 알림 본문
    pub display_text: String,
    /// 파일 이름 (파일 메시지)
    pub file_name: Option<String>,
    /// 음성 길이 (음성 메시지, 초)
    pub audio_duration: Option<String>,
}
