//! 프로세스 조회 및 종료.
//!
//! `ProcessController` 포트 구현.

use async_trait::async_trait;
use heistguard_core::error::CoreError;
use heistguard_core::ports::process::{ProcessController, ProcessMatch};
use std::sync::Mutex;
use sysinfo::{Pid, System};
use tracing::{debug, info};

/// 프로세스 추적기 — `ProcessController` 포트 구현
pub struct ProcessTracker {
    sys: Mutex<System>,
}

impl ProcessTracker {
    /// 새 프로세스 추적기 생성
    pub fn new() -> Self {
        Self {
            sys: Mutex::new(System::new_all()),
        }
    }
}

impl Default for ProcessTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessController for ProcessTracker {
    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<ProcessMatch>, CoreError> {
        let mut sys = self
            .sys
            .lock()
            .map_err(|e| CoreError::Internal(format!("시스템 잠금 실패: {e}")))?;
        sys.refresh_processes(sysinfo::ProcessesToUpdate::All, true);

        let found = sys
            .processes()
            .values()
            .map(|p| ProcessMatch {
                pid: p.pid().as_u32(),
                name: p.name().to_string_lossy().to_string(),
            })
            .find(|p| p.name.starts_with(prefix));

        if let Some(ref p) = found {
            debug!("프로세스 발견: {} (PID {})", p.name, p.pid);
        }
        Ok(found)
    }

    async fn terminate(&self, pid: u32) -> Result<(), CoreError> {
        let sys = self
            .sys
            .lock()
            .map_err(|e| CoreError::Internal(format!("시스템 잠금 실패: {e}")))?;

        let process = sys
            .process(Pid::from_u32(pid))
            .ok_or_else(|| CoreError::Internal(format!("PID {pid} 프로세스 없음")))?;

        // SIGTERM 우선, 미지원 플랫폼은 강제 종료
        let sent = process
            .kill_with(sysinfo::Signal::Term)
            .unwrap_or_else(|| process.kill());
        if !sent {
            return Err(CoreError::Internal(format!("PID {pid} 종료 시그널 전송 실패")));
        }

        info!("종료 시그널 전송: PID {pid}");
        Ok(())
    }
}
