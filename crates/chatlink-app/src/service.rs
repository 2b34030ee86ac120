//! 서비스 수명주기 어댑터.
//!
//! 호스트 프로세스의 시작/중지 요청을 연결 감독자에 전달하고,
//! "실행 중이어야 함" 의도를 [`ServiceStateStore`]에 기록한다.

use chatlink_core::config::ServerConfig;
use chatlink_core::error::CoreError;
use chatlink_core::models::session::Endpoint;
use chatlink_core::service_state::ServiceStateStore;
use chatlink_relay::supervisor::SupervisorHandle;
use tracing::{info, warn};

/// 서비스 수명주기 어댑터
pub struct ServiceLifecycleAdapter {
    supervisor: SupervisorHandle,
    store: ServiceStateStore,
    server: ServerConfig,
}

impl ServiceLifecycleAdapter {
    /// 새 어댑터 생성
    pub fn new(supervisor: SupervisorHandle, store: ServiceStateStore, server: ServerConfig) -> Self {
        Self {
            supervisor,
            store,
            server,
        }
    }

    /// 서비스 시작: 주소 검증 → 의도 기록 → 감독자 시작
    ///
    /// 의도 기록 실패는 경고만 남기고 연결은 계속 진행한다.
    pub fn start(&self, address: &str) -> Result<(), CoreError> {
        let address = address.trim();
        let endpoint = Endpoint::from_address(address, &self.server)?;

        if let Err(e) = self.store.mark_enabled(address) {
            warn!("서비스 상태 저장 실패: {e}");
        }
        info!("서비스 시작: {endpoint}");
        self.supervisor.start(address);
        Ok(())
    }

    /// 서비스 중지: 의도 해제 → 감독자 중지
    pub fn stop(&self) {
        if let Err(e) = self.store.mark_disabled() {
            warn!("서비스 상태 저장 실패: {e}");
        }
        info!("서비스 중지");
        self.supervisor.stop();
    }

    /// 프로세스 종료: 감독자만 중지하고 실행 의도는 유지
    pub fn shutdown(&self) {
        info!("프로세스 종료, 다음 실행 시 자동 재개");
        self.supervisor.stop();
    }

    /// 저장된 의도에 따라 자동 시작
    ///
    /// 시작한 주소를 반환하며, 비활성 상태면 `None`.
    pub fn resume(&self) -> Option<String> {
        let state = self.store.load();
        let address = state.autostart_address()?.to_string();

        match self.start(&address) {
            Ok(()) => {
                info!("저장된 서비스 상태로 자동 시작: {address}");
                Some(address)
            }
            Err(e) => {
                warn!("저장된 서버 주소가 유효하지 않음: {e}");
                None
            }
        }
    }

    /// 감독자 핸들
    pub fn supervisor(&self) -> &SupervisorHandle {
        &self.supervisor
    }
}
