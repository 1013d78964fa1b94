//! 액션 디스패처.
//!
//! 확정된 히트 이후 정확히 하나의 완화 액션을 실행한다.
//! 액션 수준 에러는 전부 여기서 흡수되어 로그로만 보고된다 —
//! 실패한 액션이 호스트 프로세스를 죽이는 일은 없다.

use std::sync::Arc;
use std::time::Duration;

use heistguard_core::config::ActionConfig;
use heistguard_core::models::worker::MitigationAction;
use heistguard_core::ports::network::InterfaceController;
use heistguard_core::ports::process::ProcessController;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// 액션 디스패처 — 프로세스 종료 또는 네트워크 일시 차단
pub struct ActionDispatcher {
    process: Arc<dyn ProcessController>,
    network: Arc<dyn InterfaceController>,
    config: ActionConfig,
}

impl ActionDispatcher {
    /// 새 디스패처 생성
    pub fn new(
        process: Arc<dyn ProcessController>,
        network: Arc<dyn InterfaceController>,
        config: ActionConfig,
    ) -> Self {
        Self {
            process,
            network,
            config,
        }
    }

    /// 선택된 액션 실행.
    ///
    /// `cancel`은 네트워크 쿨다운 대기에만 영향을 준다. 취소가 와도
    /// 이미 비활성화한 인터페이스 복원은 반드시 수행한다.
    pub async fn dispatch(&self, action: MitigationAction, cancel: watch::Receiver<bool>) {
        match action {
            MitigationAction::KillProcess => self.kill_process().await,
            MitigationAction::DisableNetwork => self.disable_network(cancel).await,
        }
    }

    /// 접두사로 대상 프로세스를 찾아 종료 시그널 전송. 재시도 없음.
    async fn kill_process(&self) {
        let prefix = &self.config.process_prefix;
        info!("대상 프로세스 검색: {prefix}*");

        let found = match self.process.find_by_prefix(prefix).await {
            Ok(found) => found,
            Err(e) => {
                error!("프로세스 검색 실패: {e}");
                return;
            }
        };

        let Some(target) = found else {
            warn!("프로세스 미발견: 접두사 {prefix} — 액션 없이 사이클 종료");
            return;
        };

        info!("프로세스 발견: {} (PID {})", target.name, target.pid);
        if let Err(e) = self.process.terminate(target.pid).await {
            error!("프로세스 종료 실패: {e}");
        }
    }

    /// 활성 인터페이스 스냅샷 → 전체 비활성화 → 쿨다운 → 스냅샷 복원.
    ///
    /// 스냅샷은 차단 시작 시점에 한 번만 찍는다. 복원은 스냅샷에
    /// 있던 인터페이스만 대상으로 하며, 중간에 다른 주체가 바꾼
    /// 상태는 반영하지 않는다. 인터페이스 단위 실패는 로그 후
    /// 나머지 처리를 계속한다.
    async fn disable_network(&self, mut cancel: watch::Receiver<bool>) {
        let snapshot = match self.network.enabled_interfaces().await {
            Ok(names) => names,
            Err(e) => {
                error!("인터페이스 열거 실패: {e}");
                return;
            }
        };
        if snapshot.is_empty() {
            warn!("차단할 인터페이스 없음");
            return;
        }

        for name in &snapshot {
            info!("비활성화: {name}");
            if let Err(e) = self.network.set_enabled(name, false).await {
                warn!("비활성화 실패 (계속 진행): {e}");
            }
        }

        // 쿨다운 카운트다운 — 취소가 오면 대기를 끊고 바로 복원으로.
        // 취소값 없는 채널 웨이크업은 틱의 남은 시간을 마저 기다린다.
        let total = self.config.cooldown_secs;
        'countdown: for remaining in (1..=total).rev() {
            info!("복원까지 {remaining}초 대기");
            let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
            loop {
                tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => break,
                    changed = cancel.changed() => {
                        if changed.is_err() || *cancel.borrow() {
                            warn!("쿨다운 중단 — 인터페이스 즉시 복원");
                            break 'countdown;
                        }
                    }
                }
            }
        }

        for name in &snapshot {
            info!("재활성화: {name}");
            if let Err(e) = self.network.set_enabled(name, true).await {
                warn!("재활성화 실패 (계속 진행): {e}");
            }
        }
    }
}
