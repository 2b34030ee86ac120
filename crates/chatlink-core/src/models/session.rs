//! 연결 세션 모델.
//!
//! 접속 대상([`Endpoint`])과 세션이 소유자에게 보고하는 이벤트([`SessionEvent`]).

use crate::config::ServerConfig;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// 세션 식별자: 재연결마다 증가하며, 이전 세션의 늦은 이벤트를 걸러낸다
pub type SessionId = u64;

/// 정상 종료 코드
pub const CLOSE_NORMAL: u16 = 1000;

/// 비정상 종료 코드 (close 프레임 없이 끊김)
pub const CLOSE_ABNORMAL: u16 = 1006;

/// 서버 주소에 허용되는 스킴 (호스트만 취함)
const ACCEPTED_SCHEMES: [&str; 4] = ["ws", "wss", "http", "https"];

/// WebSocket 접속 대상
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// 호스트 (IP 또는 도메인)
    pub host: String,
    /// 포트
    pub port: u16,
    /// `wss://` 여부
    pub secure: bool,
    /// 경로
    pub path: String,
}

impl Endpoint {
    /// 서버 주소 문자열 + 서버 설정으로 접속 대상 생성
    ///
    /// `http://1.2.3.4:3000/` 같은 URL 형태가 들어와도 호스트만 취하며,
    /// 포트와 스킴은 설정을 따른다. 사용자 정보, 쿼리, 프래그먼트가 붙은 주소는 거부한다.
    pub fn from_address(address: &str, server: &ServerConfig) -> Result<Self, CoreError> {
        let host = Self::parse_host(address)?;

        let path = if server.path.starts_with('/') {
            server.path.clone()
        } else {
            format!("/{}", server.path)
        };

        Ok(Self {
            host,
            port: server.port,
            secure: server.secure,
            path,
        })
    }

    /// 접속 URL (`ws://host:port/path`)
    pub fn url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        // IPv6 리터럴은 대괄호로 감싼다
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        format!("{scheme}://{host}:{}{}", self.port, self.path)
    }

    fn parse_host(address: &str) -> Result<String, CoreError> {
        let invalid = |message: String| CoreError::Validation {
            field: "server_address".to_string(),
            message,
        };

        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(invalid(format!("호스트가 비어 있음: {address:?}")));
        }

        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else if trimmed.matches(':').count() > 1 && !trimmed.starts_with('[') {
            // 대괄호 없는 IPv6 리터럴
            format!("ws://[{trimmed}]")
        } else {
            format!("ws://{trimmed}")
        };

        let parsed = url::Url::parse(&candidate)
            .map_err(|e| invalid(format!("잘못된 주소 {address:?}: {e}")))?;

        if !ACCEPTED_SCHEMES.contains(&parsed.scheme()) {
            return Err(invalid(format!(
                "지원하지 않는 스킴 {:?}: {address:?}",
                parsed.scheme()
            )));
        }
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(invalid(format!("사용자 정보가 포함된 주소: {address:?}")));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(invalid(format!("쿼리/프래그먼트가 포함된 주소: {address:?}")));
        }

        match parsed.host() {
            Some(url::Host::Domain(domain)) if !domain.is_empty() => Ok(domain.to_string()),
            Some(url::Host::Ipv4(ip)) => Ok(ip.to_string()),
            Some(url::Host::Ipv6(ip)) => Ok(ip.to_string()),
            _ => Err(invalid(format!("호스트가 비어 있음: {address:?}"))),
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url())
    }
}

/// 세션이 소유자에게 보고하는 이벤트
///
/// 시도 1회당 `Closed` 또는 `Error` 중 정확히 하나가 마지막에 온다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// 연결 수립
    Opened,
    /// 텍스트 프레임 수신
    Message(String),
    /// 연결 종료
    Closed {
        /// 종료 코드
        code: u16,
        /// 종료 사유
        reason: String,
    },
    /// 전송 오류
    Error(String),
}

impl SessionEvent {
    /// 종료 이벤트 여부
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionEvent::Closed { .. } | SessionEvent::Error(_))
    }
}

/// 세션 ID가 붙은 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEnvelope {
    /// 이벤트를 보낸 세션
    pub session_id: SessionId,
    /// 이벤트
    pub event: SessionEvent,
}
