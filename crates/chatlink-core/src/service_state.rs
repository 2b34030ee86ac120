//! 서비스 실행 의도 영속화.
//!
//! "서비스 활성화" 플래그와 마지막 서버 주소를 JSON 파일로 저장한다.
//! 프로세스 시작 시 이 값을 읽어 자동으로 `start`할지 결정한다.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 상태 파일 이름
pub const STATE_FILE_NAME: &str = "service_state.json";

/// 영속화된 서비스 상태
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceState {
    /// 서비스 실행 의도
    #[serde(default)]
    pub service_enabled: bool,
    /// 마지막으로 사용한 서버 주소
    #[serde(default)]
    pub server_ip: String,
}

impl ServiceState {
    /// 자동 시작 대상 주소 (활성화 + 주소 존재 시)
    pub fn autostart_address(&self) -> Option<&str> {
        let address = self.server_ip.trim();
        (self.service_enabled && !address.is_empty()).then_some(address)
    }
}

/// 서비스 상태 저장소
#[derive(Debug, Clone)]
pub struct ServiceStateStore {
    path: PathBuf,
}

impl ServiceStateStore {
    /// 지정된 경로의 저장소
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// 데이터 디렉토리 아래 기본 파일명으로 저장소 생성
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STATE_FILE_NAME))
    }

    /// 상태 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 상태 로드
    ///
    /// 파일이 없거나 손상된 경우 기본값(비활성)을 반환한다.
    pub fn load(&self) -> ServiceState {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => {
                debug!("서비스 상태 파일 없음: {}", self.path.display());
                return ServiceState::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("서비스 상태 파일 파싱 실패, 기본값 사용: {e}");
            ServiceState::default()
        })
    }

    /// 상태 저장
    pub fn save(&self, state: &ServiceState) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, content)?;
        debug!(
            "서비스 상태 저장: enabled={}, server_ip={}",
            state.service_enabled, state.server_ip
        );
        Ok(())
    }

    /// 실행 의도 기록 (주소 포함)
    pub fn mark_enabled(&self, server_ip: &str) -> Result<(), CoreError> {
        self.save(&ServiceState {
            service_enabled: true,
            server_ip: server_ip.to_string(),
        })
    }

    /// 중지 의도 기록 (마지막 주소는 유지)
    pub fn mark_disabled(&self) -> Result<(), CoreError> {
        let mut state = self.load();
        state.service_enabled = false;
        self.save(&state)
    }
}
