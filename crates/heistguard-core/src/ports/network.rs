//! 네트워크 인터페이스 제어 포트.
//!
//! 구현: `heistguard-monitor` crate (sysinfo 열거 + 플랫폼 셸 도구)

use async_trait::async_trait;

use crate::error::CoreError;

/// 네트워크 인터페이스 열거/전환
#[async_trait]
pub trait InterfaceController: Send + Sync {
    /// 현재 활성화된 인터페이스 이름 목록 (루프백/가상 "local" 제외).
    ///
    /// 디스패처는 차단 시작 시점에 한 번만 호출해 스냅샷을 만들고,
    /// 복원 시 그 스냅샷을 그대로 사용한다.
    async fn enabled_interfaces(&self) -> Result<Vec<String>, CoreError>;

    /// 인터페이스 활성화 상태 변경.
    ///
    /// 실패는 `CoreError::InterfaceToggle`로 보고하며, 호출자는
    /// 나머지 인터페이스 처리를 계속한다.
    async fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), CoreError>;
}
