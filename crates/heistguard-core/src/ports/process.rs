//! 프로세스 제어 포트.
//!
//! 구현: `heistguard-monitor` crate (sysinfo)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 접두사 검색으로 찾은 프로세스
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessMatch {
    /// 프로세스 ID
    pub pid: u32,
    /// 프로세스 이름
    pub name: String,
}

/// 프로세스 조회/종료
#[async_trait]
pub trait ProcessController: Send + Sync {
    /// 이름이 `prefix`로 시작하는 실행 중 프로세스 검색.
    ///
    /// 없으면 `Ok(None)` — 부재 자체는 에러가 아니고, 디스패처가
    /// `ProcessNotFound`로 보고할지 결정한다.
    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<ProcessMatch>, CoreError>;

    /// 지정 프로세스에 종료 시그널 전송
    async fn terminate(&self, pid: u32) -> Result<(), CoreError>;
}
