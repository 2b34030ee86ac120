//! # chatlink-core
//!
//! chatlink 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`]: 메시지/알림/세션 데이터 구조체
//! - [`ports`]: Hexagonal Architecture 포트 인터페이스
//! - [`classifier`]: 수신 페이로드 → [`models::message::ClassifiedMessage`] 변환
//! - [`error`]: 핵심 에러 타입 (thiserror)
//! - [`config`]: 애플리케이션 설정 구조체
//! - [`config_manager`]: 설정 파일 관리 (로드/저장)
//! - [`service_state`]: 서비스 실행 의도 영속화

pub mod classifier;
pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;
pub mod service_state;

#[cfg(test)]
mod tests {
    use crate::models::message::MessageKind;
    use crate::models::notification::NotificationEvent;

    #[test]
    fn config_defaults() {
        let config = crate::config::AppConfig::default_config();
        assert_eq!(config.server.port, 3000);
        assert!(!config.server.secure);
        assert_eq!(config.reconnect.delay_ms, 5_000);
        assert!(config.notification.enabled);
    }

    #[test]
    fn classified_message_to_notification() {
        let msg = crate::classifier::classify(r#"{"username":"alice","text":"안녕"}"#);
        assert_eq!(msg.kind, MessageKind::UserText);

        let event = NotificationEvent::from_message(&msg, 42);
        assert_eq!(event.id, 42);
        assert!(event.title.contains("alice"));
        assert_eq!(event.body, "안녕");
        assert!(!event.suppress);
    }
}
