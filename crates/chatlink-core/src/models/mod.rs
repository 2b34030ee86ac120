//! chatlink 도메인 모델.
//!
//! 수신 메시지 분류 결과, 알림 이벤트, 세션 엔드포인트/이벤트를 정의한다.

pub mod message;
pub mod notification;
pub mod session;
