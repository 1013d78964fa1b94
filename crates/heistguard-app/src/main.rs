//! heistguard 바이너리 진입점.
//!
//! DI 컨테이너 역할: 설정 로드 + CLI 오버라이드, 어댑터 조립,
//! 수퍼바이저 기동, 시그널 기반 협조적 정지.

use anyhow::{anyhow, Result};
use clap::Parser;
use heistguard_app::worker::WorkerSupervisor;
use heistguard_core::config_manager::ConfigManager;
use heistguard_core::models::worker::{MitigationAction, WorkerState};
use heistguard_monitor::network::InterfaceToggle;
use heistguard_monitor::privilege;
use heistguard_monitor::process::ProcessTracker;
use heistguard_vision::capture::WindowCapture;
use heistguard_vision::template::ReferenceTemplate;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 화면 마커 감시 워치독
///
/// 대상 창에 마커가 나타나면 프로세스를 종료하거나
/// 네트워크를 일시 차단한다.
#[derive(Parser, Debug)]
#[command(name = "heistguard")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 프로세스 종료 대신 네트워크 일시 차단 사용
    #[arg(long, short = 'n')]
    network: bool,

    /// 루프 모드 — 액션 후 감시를 계속한다
    #[arg(long)]
    loop_mode: bool,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리)
    #[arg(long)]
    config: Option<PathBuf>,

    /// 캡처 폴링 간격 (밀리초)
    #[arg(long)]
    poll_interval: Option<u64>,

    /// 매칭 히트 임계값 (0.0 ~ 1.0)
    #[arg(long)]
    threshold: Option<f64>,

    /// 네트워크 차단 유지 시간 (초)
    #[arg(long)]
    cooldown: Option<u64>,

    /// 감시 대상 창 제목
    #[arg(long)]
    window_title: Option<String>,

    /// 마커 원본 이미지 경로
    #[arg(long)]
    template: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // 설정 로드 + CLI 오버라이드
    let manager = match &args.config {
        Some(path) => ConfigManager::with_path(path.clone())?,
        None => ConfigManager::new()?,
    };
    let mut config = manager.get();
    if args.network {
        config.action.kind = MitigationAction::DisableNetwork;
    }
    if args.loop_mode {
        config.watch.loop_mode = true;
    }
    if let Some(ms) = args.poll_interval {
        config.watch.poll_interval_ms = ms;
    }
    if let Some(t) = args.threshold {
        config.vision.match_threshold = t;
    }
    if let Some(secs) = args.cooldown {
        config.action.cooldown_secs = secs;
    }
    if let Some(title) = args.window_title {
        config.watch.window_title = title;
    }
    if let Some(path) = args.template {
        config.vision.template_path = path;
    }
    config.validate()?;

    // 권한 검사는 워커 시작 전에 — 루프 한복판에서 터지지 않게
    privilege::ensure_privileges_for(config.action.kind)
        .map_err(|e| anyhow!("{e} (관리자 권한으로 다시 실행하세요)"))?;

    info!(
        "heistguard 시작: 창 \"{}\", 액션 {}, 루프 모드 {}",
        config.watch.window_title, config.action.kind, config.watch.loop_mode
    );

    // 어댑터 조립
    let template = ReferenceTemplate::load(
        &config.vision.template_path,
        config.vision.baseline_width,
        config.vision.cache_dir.clone(),
    )?;
    let frame_source = Arc::new(WindowCapture::new(config.watch.window_title.clone()));
    let process = Arc::new(ProcessTracker::new());
    let network = Arc::new(InterfaceToggle::new(
        config.action.excluded_interface_prefixes.clone(),
    ));

    let supervisor = WorkerSupervisor::new(config, template, frame_source, process, network);
    supervisor.start().map_err(|e| anyhow!("{e}"))?;

    // 시그널 또는 워커 완료까지 대기
    let mut state_rx = supervisor.subscribe_state();
    loop {
        tokio::select! {
            _ = wait_for_signal() => {
                warn!("종료 시그널 수신 — 워커 정지");
                supervisor.stop().await;
                break;
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *state_rx.borrow();
                info!("워커 상태: {state}");
                if state == WorkerState::Completed {
                    supervisor.stop().await;
                    break;
                }
            }
        }
    }

    info!("heistguard 종료");
    Ok(())
}

/// OS 종료 시그널 대기 (SIGINT/SIGTERM, Windows는 Ctrl+C)
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigint = signal(SignalKind::interrupt()).expect("SIGINT 핸들러 등록 실패");
        let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM 핸들러 등록 실패");
        tokio::select! {
            _ = sigint.recv() => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Ctrl+C 핸들러 등록 실패");
    }
}
