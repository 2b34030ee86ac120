//! 애플리케이션 설정 구조체.
//!
//! 서버 포트/스킴, 재연결 지연, 알림, 서버 점검 설정을 정의한다.
//! `config_manager`가 JSON 파일 + 환경변수(`CHATLINK__*`)에서 로드한다.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 서버 연결 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 재연결 설정
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    /// 알림 설정
    #[serde(default)]
    pub notification: NotificationConfig,
    /// 서버 가용성 점검 설정
    #[serde(default)]
    pub probe: ProbeConfig,
}

impl AppConfig {
    /// 기본 설정
    pub fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            reconnect: ReconnectConfig::default(),
            notification: NotificationConfig::default(),
            probe: ProbeConfig::default(),
        }
    }

    /// 재연결 지연 (Duration)
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect.delay_ms)
    }

    /// 서버 점검 타임아웃 (Duration)
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe.timeout_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

// ============================================================
// 서버 연결 설정
// ============================================================

/// 서버 연결 설정: 주소는 런타임에 `start(address)`로 전달된다
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// WebSocket 포트
    #[serde(default = "default_port")]
    pub port: u16,
    /// `wss://` 사용 여부 (표준 인증서 검증)
    #[serde(default)]
    pub secure: bool,
    /// 접속 경로
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            secure: false,
            path: default_path(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_path() -> String {
    "/".to_string()
}

// ============================================================
// 재연결 설정
// ============================================================

/// 재연결 설정: 고정 지연, 무제한 재시도
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// 재연결 지연 (밀리초)
    #[serde(default = "default_reconnect_delay_ms")]
    pub delay_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_reconnect_delay_ms(),
        }
    }
}

fn default_reconnect_delay_ms() -> u64 {
    5_000
}

// ============================================================
// 알림 설정
// ============================================================

/// 알림 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// 메시지 알림 활성화
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 연결 상태 알림 (상주 상태 표시줄)
    #[serde(default = "default_true")]
    pub status_notifications: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            status_notifications: true,
        }
    }
}

// ============================================================
// 서버 점검 설정
// ============================================================

/// 서버 가용성 점검 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// 요청 타임아웃 (밀리초)
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
    /// 점검 대상 서버 URL 목록
    #[serde(default)]
    pub candidates: Vec<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_probe_timeout_ms(),
            candidates: Vec::new(),
        }
    }
}

fn default_probe_timeout_ms() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.reconnect_delay(), Duration::from_secs(5));
        assert_eq!(config.probe_timeout(), Duration::from_secs(5));
        assert!(config.probe.candidates.is_empty());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"server": {"secure": true}, "reconnect": {"delay_ms": 250}}"#)
                .unwrap();
        assert!(config.server.secure);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.path, "/");
        assert_eq!(config.reconnect_delay(), Duration::from_millis(250));
    }
}
