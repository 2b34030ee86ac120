//! 연결 세션 포트.
//!
//! 구현: `chatlink-network` crate (tokio-tungstenite)
//!
//! 세션 열기는 블로킹하지 않는다. 연결 결과와 수신 프레임은
//! 모두 [`SessionEnvelope`] 채널로 보고된다.

use tokio::sync::mpsc;

use crate::models::session::{Endpoint, SessionEnvelope, SessionId};

/// 세션 생성기
pub trait SessionConnector: Send + Sync {
    /// 새 세션을 열고 즉시 핸들을 반환한다.
    ///
    /// `Opened`는 최대 1회, 이후 `Closed`/`Error` 중 정확히 하나가 `events`로 전달된다.
    fn open(
        &self,
        endpoint: &Endpoint,
        session_id: SessionId,
        events: mpsc::UnboundedSender<SessionEnvelope>,
    ) -> Box<dyn SessionHandle>;
}

/// 열린(또는 열리는 중인) 세션 핸들
pub trait SessionHandle: Send {
    /// 텍스트 프레임 전송. 열려 있지 않으면 조용히 버린다.
    fn send(&self, text: &str);

    /// 정상 종료 요청. 이미 닫힌 세션이면 no-op.
    fn close(&self, reason: &str);

    /// 연결 수립 여부
    fn is_open(&self) -> bool;
}
