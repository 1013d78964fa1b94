//! 워커 상태 및 완화 액션 모델.

use serde::{Deserialize, Serialize};

/// 히트 시 실행할 완화 액션.
///
/// 닫힌 집합이며 디스패처에서 망라적 match로 분기한다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MitigationAction {
    /// 대상 프로세스 종료
    #[default]
    KillProcess,
    /// 네트워크 인터페이스 일시 차단 후 복원
    DisableNetwork,
}

impl std::fmt::Display for MitigationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MitigationAction::KillProcess => write!(f, "kill-process"),
            MitigationAction::DisableNetwork => write!(f, "disable-network"),
        }
    }
}

/// 워커 라이프사이클 상태.
///
/// Idle → Running → (Stopping → Idle | Completed → Idle).
/// 제어 표면은 이 상태만 관측하며 캡처 내부에는 접근하지 않는다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerState {
    /// 워커 없음
    Idle,
    /// 탐지 루프 실행 중
    Running,
    /// 정지 요청 수신, 협조적 취소 진행 중
    Stopping,
    /// 사이클 정상 종료 (loop_mode=false)
    Completed,
}

impl WorkerState {
    /// 제어 표면 관점의 "실행 중" 여부
    pub fn is_running(&self) -> bool {
        matches!(self, WorkerState::Running | WorkerState::Stopping)
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerState::Idle => write!(f, "Idle"),
            WorkerState::Running => write!(f, "Running"),
            WorkerState::Stopping => write!(f, "Stopping"),
            WorkerState::Completed => write!(f, "Completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_classification() {
        assert!(!WorkerState::Idle.is_running());
        assert!(WorkerState::Running.is_running());
        assert!(WorkerState::Stopping.is_running());
        assert!(!WorkerState::Completed.is_running());
    }

    #[test]
    fn action_snake_case_serde() {
        let json = serde_json::to_string(&MitigationAction::KillProcess).unwrap();
        assert_eq!(json, "\"kill_process\"");
    }
}
