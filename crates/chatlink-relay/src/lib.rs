//! # chatlink-relay
//!
//! 지속 연결 수명주기 관리자.
//!
//! - [`scheduler`]: 고정 지연 재연결 타이머 (동시에 최대 1개)
//! - [`supervisor`]: 세션 이벤트를 직렬화하여 상태를 전이하고
//!   `SessionStatus`/`NotificationEvent`를 내보내는 상태 머신

pub mod scheduler;
pub mod supervisor;
