//! # chatlink-app
//!
//! chatlink 클라이언트 바이너리 진입점.
//! DI 와이어링, 서비스 수명주기, 알림 오케스트레이션.

mod lifecycle;
mod notification_manager;
mod notifier;
mod service;

use anyhow::{bail, Context, Result};
use chatlink_core::config::AppConfig;
use chatlink_core::config_manager::ConfigManager;
use chatlink_core::ports::notifier::NotificationSink;
use chatlink_core::ports::transport::SessionConnector;
use chatlink_core::service_state::ServiceStateStore;
use chatlink_network::server_probe::ServerProbe;
use chatlink_network::ws_session::WsConnector;
use chatlink_relay::supervisor::ConnectionSupervisor;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::lifecycle::LifecycleManager;
use crate::notification_manager::NotificationManager;
use crate::notifier::{DesktopNotifier, LogNotifier};
use crate::service::ServiceLifecycleAdapter;

/// 종료 시 감독자 정리 대기 시간
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// chatlink 클라이언트
///
/// 채팅 서버와 WebSocket 연결을 유지하며 수신 메시지를 알림으로 전달한다.
#[derive(Parser, Debug)]
#[command(name = "chatlink")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 서버 주소 (IP 또는 호스트). 생략 시 저장된 서비스 상태로 자동 시작
    #[arg(long, short = 's')]
    server: Option<String>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 재연결 지연 (밀리초, 설정 파일 값을 덮어씀)
    #[arg(long)]
    reconnect_delay_ms: Option<u64>,

    /// 데스크톱 알림 대신 로그로 알림 출력
    #[arg(long)]
    headless: bool,

    /// 서버 가용성 점검 후 종료
    #[arg(long)]
    probe: bool,

    /// 서비스 비활성화 (자동 시작 해제) 후 종료
    #[arg(long)]
    disable: bool,

    /// 저장된 서비스 상태 출력 후 종료
    #[arg(long)]
    status: bool,
}

/// 설정 로드 (CLI 경로 > 플랫폼 기본 경로 > 기본값)
fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    if let Some(path) = path {
        let manager = ConfigManager::with_path(path.clone())
            .with_context(|| format!("설정 파일 로드 실패: {}", path.display()))?;
        return Ok(manager.get());
    }

    match ConfigManager::new() {
        Ok(manager) => {
            info!("설정 파일: {}", manager.config_path().display());
            Ok(manager.get())
        }
        Err(e) => {
            warn!("설정 관리자 초기화 실패, 기본 설정 사용: {e}");
            Ok(AppConfig::default_config())
        }
    }
}

/// 서비스 상태 저장소 (플랫폼 데이터 디렉토리)
fn state_store() -> ServiceStateStore {
    let data_dir = ConfigManager::data_dir().unwrap_or_else(|e| {
        warn!("데이터 디렉토리 확인 실패, 현재 디렉토리 사용: {e}");
        PathBuf::from(".")
    });
    ServiceStateStore::in_dir(&data_dir)
}

/// 즉시 종료 명령 처리 (상태/점검)
///
/// 명령을 처리했으면 true (프로그램 종료), 아니면 false.
async fn handle_commands(args: &Args, config: &AppConfig, store: &ServiceStateStore) -> Result<bool> {
    if args.status {
        let state = store.load();
        match state.autostart_address() {
            Some(address) => println!("✅ 서비스: 활성화됨 ({address})"),
            None if state.server_ip.is_empty() => println!("❌ 서비스: 비활성화됨"),
            None => println!("❌ 서비스: 비활성화됨 (마지막 서버: {})", state.server_ip),
        }
        println!("   상태 파일: {}", store.path().display());
        return Ok(true);
    }

    if args.probe {
        let candidates = match &args.server {
            Some(server) => vec![server.clone()],
            None => config.probe.candidates.clone(),
        };
        if candidates.is_empty() {
            bail!("점검할 서버가 없습니다 (--server 또는 probe.candidates 설정)");
        }

        let probe = ServerProbe::new(config.probe_timeout())?;
        let available = probe.available(&candidates).await;
        for candidate in &candidates {
            let mark = if available.contains(candidate) { "✅" } else { "❌" };
            println!("{mark} {candidate}");
        }
        if available.is_empty() {
            bail!("가용 서버 없음");
        }
        return Ok(true);
    }

    Ok(false)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = &args.log_level;
    let log_filter = format!(
        "chatlink={level},chatlink_app={level},chatlink_core={level},chatlink_network={level},chatlink_relay={level}"
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    let config = load_config(args.config.as_ref())?;
    let store = state_store();

    if handle_commands(&args, &config, &store).await? {
        return Ok(());
    }

    // 1. 연결 감독자
    let reconnect_delay = args
        .reconnect_delay_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.reconnect_delay());
    let connector: Arc<dyn SessionConnector> = Arc::new(WsConnector::new());
    let (supervisor, outputs) =
        ConnectionSupervisor::spawn(config.server.clone(), reconnect_delay, connector);

    // 2. 라이프사이클
    let lifecycle = LifecycleManager::new();

    // 3. 알림 관리자 (감독자 출력 단독 소비)
    let notifier: Arc<dyn NotificationSink> = if args.headless {
        Arc::new(LogNotifier::new())
    } else {
        Arc::new(DesktopNotifier::new())
    };
    let notification_manager = NotificationManager::new(config.notification.clone(), notifier);
    let notification_task = {
        let shutdown_rx = lifecycle.subscribe();
        tokio::spawn(async move { notification_manager.run(outputs, shutdown_rx).await })
    };

    // 4. 서비스 시작 (CLI 주소 > 저장된 상태)
    let adapter = ServiceLifecycleAdapter::new(supervisor, store, config.server.clone());
    if args.disable {
        adapter.stop();
        println!("✅ 서비스 비활성화됨. 다음 실행 시 자동 시작하지 않습니다.");
        lifecycle.finish(adapter.supervisor(), SHUTDOWN_GRACE).await;
        let _ = notification_task.await;
        return Ok(());
    }
    let started = match &args.server {
        Some(server) => {
            adapter.start(server)?;
            Some(server.clone())
        }
        None => adapter.resume(),
    };
    let Some(address) = started else {
        println!("저장된 서비스 상태가 없습니다. 시작하려면: chatlink --server <주소>");
        lifecycle.finish(adapter.supervisor(), SHUTDOWN_GRACE).await;
        let _ = notification_task.await;
        return Ok(());
    };

    info!("chatlink 실행 중: {address} (Ctrl+C로 종료)");

    // OS 시그널 → 감독자 중지 → 마지막 상태 알림 처리 후 종료
    LifecycleManager::wait_for_signal()
        .await
        .context("시그널 핸들러 등록 실패")?;
    adapter.shutdown();
    let state = lifecycle.finish(adapter.supervisor(), SHUTDOWN_GRACE).await;
    let _ = notification_task.await;

    info!("chatlink 종료 ({state})");
    Ok(())
}
