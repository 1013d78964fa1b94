//! 워커 오케스트레이터.
//!
//! 지오메트리 해상 → 템플릿 스케일 → 탐지 루프 → 안정화 대기 →
//! 액션 디스패치를 하나의 취소 가능한 tokio 태스크로 실행한다.
//! 동시에 최대 한 개의 워커만 허용하며, 제어 표면은
//! `WorkerState` watch 채널로만 상태를 관측한다.
//!
//! 취소는 협조적이다: 취소 토큰이 폴링 대기, 안정화 대기,
//! 네트워크 쿨다운의 모든 중단 지점에서 확인된다.

use std::sync::{Arc, Mutex, RwLock};

use heistguard_core::config::AppConfig;
use heistguard_core::error::CoreError;
use heistguard_core::models::geometry::SearchRegion;
use heistguard_core::models::worker::{MitigationAction, WorkerState};
use heistguard_core::ports::capture::FrameSource;
use heistguard_core::ports::network::InterfaceController;
use heistguard_core::ports::process::ProcessController;
use heistguard_vision::detector::DetectionLoop;
use heistguard_vision::template::ReferenceTemplate;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::dispatch::ActionDispatcher;

/// 실행 중인 워커의 핸들
struct RunningWorker {
    cancel_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// 워커 수퍼바이저 — 제어 표면이 바라보는 유일한 진입점
pub struct WorkerSupervisor {
    config: RwLock<AppConfig>,
    template: Arc<ReferenceTemplate>,
    frame_source: Arc<dyn FrameSource>,
    process: Arc<dyn ProcessController>,
    network: Arc<dyn InterfaceController>,
    state_tx: watch::Sender<WorkerState>,
    state_rx: watch::Receiver<WorkerState>,
    running: Mutex<Option<RunningWorker>>,
}

impl WorkerSupervisor {
    /// 새 수퍼바이저 생성 (Idle 상태)
    pub fn new(
        config: AppConfig,
        template: ReferenceTemplate,
        frame_source: Arc<dyn FrameSource>,
        process: Arc<dyn ProcessController>,
        network: Arc<dyn InterfaceController>,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(WorkerState::Idle);
        Self {
            config: RwLock::new(config),
            template: Arc::new(template),
            frame_source,
            process,
            network,
            state_tx,
            state_rx,
            running: Mutex::new(None),
        }
    }

    /// 워커 상태 수신기 복제
    pub fn subscribe_state(&self) -> watch::Receiver<WorkerState> {
        self.state_rx.clone()
    }

    /// 제어 표면용 "실행 중" 여부
    pub fn is_running(&self) -> bool {
        self.state_rx.borrow().is_running()
    }

    /// 완화 액션 변경. 워커 실행 중에는 거부된다.
    pub fn set_action(&self, action: MitigationAction) -> Result<(), CoreError> {
        if self.is_running() {
            return Err(CoreError::Internal(
                "워커 실행 중에는 액션을 변경할 수 없음".to_string(),
            ));
        }
        self.config.write().unwrap().action.kind = action;
        info!("액션 설정: {action}");
        Ok(())
    }

    /// 워커 시작. 이미 실행 중이면 거부.
    pub fn start(&self) -> Result<(), CoreError> {
        let mut running = self.running.lock().unwrap();
        if let Some(worker) = running.as_ref() {
            if !worker.handle.is_finished() {
                return Err(CoreError::Internal("워커가 이미 실행 중".to_string()));
            }
        }
        // 이전 사이클의 종료된 핸들 정리
        *running = None;

        let config = self.config.read().unwrap().clone();
        config.validate()?;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let ctx = WorkerContext {
            config,
            template: self.template.clone(),
            frame_source: self.frame_source.clone(),
            process: self.process.clone(),
            network: self.network.clone(),
            state_tx: self.state_tx.clone(),
        };

        let _ = self.state_tx.send(WorkerState::Running);
        let handle = tokio::spawn(run_cycles(ctx, cancel_rx));
        *running = Some(RunningWorker { cancel_tx, handle });

        info!("워커 시작");
        Ok(())
    }

    /// 워커 정지 (협조적 취소, 종료까지 대기).
    ///
    /// 히트 전에 정지하면 어떤 액션도 실행되지 않는다.
    pub async fn stop(&self) {
        let worker = self.running.lock().unwrap().take();
        if let Some(worker) = worker {
            let _ = self.state_tx.send(WorkerState::Stopping);
            let _ = worker.cancel_tx.send(true);
            if let Err(e) = worker.handle.await {
                error!("워커 태스크 종료 실패: {e}");
            }
            info!("워커 정지 완료");
        }
        let _ = self.state_tx.send(WorkerState::Idle);
    }
}

/// 워커 태스크에 넘기는 불변 컨텍스트
struct WorkerContext {
    config: AppConfig,
    template: Arc<ReferenceTemplate>,
    frame_source: Arc<dyn FrameSource>,
    process: Arc<dyn ProcessController>,
    network: Arc<dyn InterfaceController>,
    state_tx: watch::Sender<WorkerState>,
}

/// 워커 본체 — 사이클 반복.
///
/// loop_mode면 액션 후 지오메트리 해상부터 다시 시작한다
/// (사이클 사이에 창이 움직이거나 크기가 바뀔 수 있다).
async fn run_cycles(ctx: WorkerContext, mut cancel: watch::Receiver<bool>) {
    let action = ctx.config.action.kind;
    let dispatcher = ActionDispatcher::new(
        ctx.process.clone(),
        ctx.network.clone(),
        ctx.config.action.clone(),
    );

    loop {
        // 1. 지오메트리 해상 (창 없으면 주 모니터 폴백)
        let resolution = match ctx.frame_source.resolve_geometry().await {
            Ok(r) => r,
            Err(e) => {
                error!("지오메트리 해상 실패, 사이클 중단: {e}");
                break;
            }
        };
        let region = SearchRegion::derive(resolution);
        info!("탐색 영역: {region:?} (해상도 {resolution})");

        // 2. 대상 너비에 맞는 스케일 템플릿 준비 (너비 키 캐시)
        let template = match ctx.template.scaled_for(resolution.width) {
            Ok(t) => t,
            Err(e) => {
                error!("템플릿 스케일 실패, 사이클 중단: {e}");
                break;
            }
        };

        // 3. 탐지 루프 — 히트 또는 취소로만 종료
        let detector = DetectionLoop::new(
            ctx.frame_source.clone(),
            template,
            region,
            ctx.config.vision.match_threshold,
            ctx.config.poll_interval(),
        );
        let Some(hit) = detector.run(cancel.clone()).await else {
            return; // 취소 — 상태 전이는 stop()이 담당
        };
        info!("마커 탐지: ({}, {}) score={:.3}", hit.x, hit.y, hit.score);

        // 4. 전환 프레임 오탐 방지용 안정화 대기
        tokio::select! {
            _ = tokio::time::sleep(ctx.config.settle_delay()) => {}
            changed = cancel.changed() => {
                if changed.is_err() || *cancel.borrow() {
                    return;
                }
            }
        }

        // 5. 액션 실행 (에러는 디스패처 내부에서 흡수)
        dispatcher.dispatch(action, cancel.clone()).await;

        if *cancel.borrow() || !ctx.config.watch.loop_mode {
            break;
        }
        info!("루프 모드 — 사이클 재시작");
    }

    if !*cancel.borrow() {
        let _ = ctx.state_tx.send(WorkerState::Completed);
    }
}
