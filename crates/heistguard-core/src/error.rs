//! heistguard 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 자체 실패를 `CoreError` 변형으로 매핑한다.
//! 탐지 루프 안에서 흡수되는 에러(창 미발견, 캡처 실패)와
//! 사이클을 끝내는 에러(프로세스 미발견)를 변형 단위로 구분한다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 대상 창을 찾을 수 없음 (폴링마다 재시도, 루프 내 흡수)
    #[error("창 미발견: {0}")]
    WindowNotFound(String),

    /// 프레임 캡처 실패 (재시도, 루프 내 흡수)
    #[error("캡처 실패: {0}")]
    Capture(String),

    /// 대상 프로세스를 찾을 수 없음 (사이클 종료, 프로세스 비치명)
    #[error("프로세스 미발견: 접두사 {prefix}")]
    ProcessNotFound {
        /// 검색에 사용한 프로세스 이름 접두사
        prefix: String,
    },

    /// 네트워크 인터페이스 상태 변경 실패 (인터페이스 단위, 나머지 계속 진행)
    #[error("인터페이스 전환 실패 — {name}: {message}")]
    InterfaceToggle {
        /// 인터페이스 이름
        name: String,
        /// 실패 사유
        message: String,
    },

    /// 관리자 권한 필요 (네트워크 차단 경로, 워커 시작 전에 검사)
    #[error("관리자 권한 필요: {0}")]
    AdminRequired(String),

    /// 템플릿 이미지 로드/스케일 실패
    #[error("템플릿 에러: {0}")]
    Template(String),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl CoreError {
    /// 탐지 루프 안에서 흡수(로그 후 재시도)되는 에러인지 여부.
    ///
    /// 창 미발견과 캡처 실패만 재시도 대상이다. 그 외는
    /// 루프 밖(디스패처/워커)에서 처리한다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::WindowNotFound(_) | CoreError::Capture(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(CoreError::WindowNotFound("Grand Theft Auto V".into()).is_retryable());
        assert!(CoreError::Capture("버퍼 변환 실패".into()).is_retryable());
        assert!(!CoreError::ProcessNotFound {
            prefix: "GTA5".into()
        }
        .is_retryable());
        assert!(!CoreError::AdminRequired("네트워크 차단".into()).is_retryable());
    }

    #[test]
    fn display_includes_context() {
        let err = CoreError::InterfaceToggle {
            name: "Ethernet".into(),
            message: "exit code 1".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("Ethernet"));
        assert!(msg.contains("exit code 1"));
    }
}
