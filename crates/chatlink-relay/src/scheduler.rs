//! 재연결 스케줄러.
//!
//! 고정 지연(기본 5초) 후 콜백을 실행한다. 지수 백오프, 지터, 최대 재시도 없음.
//! 새 예약은 대기 중인 이전 예약을 취소한다.

use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// 기본 재연결 지연
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// 예약 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// 대기 중인 예약
#[derive(Debug)]
struct PendingTimer {
    id: TimerId,
    task: JoinHandle<()>,
}

/// 재연결 스케줄러: 대기 타이머는 최대 1개
#[derive(Debug)]
pub struct ReconnectScheduler {
    delay: Duration,
    next_id: u64,
    pending: Option<PendingTimer>,
}

impl ReconnectScheduler {
    /// 지정 지연으로 생성
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_id: 0,
            pending: None,
        }
    }

    /// 설정된 지연
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 설정된 지연 후 콜백 실행
    pub fn schedule<F>(&mut self, callback: F) -> TimerId
    where
        F: FnOnce(TimerId) + Send + 'static,
    {
        self.schedule_after(self.delay, callback)
    }

    /// `delay` 후 콜백 실행. 대기 중인 예약이 있으면 먼저 취소한다.
    pub fn schedule_after<F>(&mut self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce(TimerId) + Send + 'static,
    {
        self.cancel_pending();

        self.next_id += 1;
        let id = TimerId(self.next_id);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback(id);
        });
        debug!("재연결 예약 {:?}: {}ms 후", id, delay.as_millis());

        self.pending = Some(PendingTimer { id, task });
        id
    }

    /// 특정 예약 취소. 이미 실행/취소된 예약이면 no-op.
    pub fn cancel(&mut self, id: TimerId) {
        if self.pending.as_ref().is_some_and(|p| p.id == id) {
            self.cancel_pending();
        }
    }

    /// 대기 중인 예약 취소 (없으면 no-op)
    pub fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
            debug!("재연결 예약 취소 {:?}", pending.id);
        }
    }

    /// 대기 중인 예약 존재 여부
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// 실행된 예약을 확인하고 대기 상태에서 제거
    ///
    /// 현재 대기 중인 예약이 아니면(취소/교체된 타이머) `false`.
    pub fn take_fired(&mut self, id: TimerId) -> bool {
        if self.pending.as_ref().is_some_and(|p| p.id == id) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

impl Default for ReconnectScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_RECONNECT_DELAY)
    }
}

impl Drop for ReconnectScheduler {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
