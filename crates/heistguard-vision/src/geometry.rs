//! 지오메트리 리졸버.
//!
//! 대상 창의 클라이언트 영역 크기를 조회하고, 창이 없으면
//! 주 모니터 해상도로 폴백한다. 창 부재는 에러가 아니다.

use heistguard_core::error::CoreError;
use heistguard_core::models::geometry::Resolution;
use tracing::debug;
use xcap::{Monitor, Window};

/// 주 모니터 해상도 조회.
///
/// 주 모니터 판별이 실패하면 첫 번째 모니터를 사용한다.
pub fn primary_resolution() -> Result<Resolution, CoreError> {
    let monitors = Monitor::all()
        .map_err(|e| CoreError::Internal(format!("모니터 목록 조회 실패: {e}")))?;

    let monitor = monitors
        .into_iter()
        .find(|m| m.is_primary().unwrap_or(false))
        .or_else(|| Monitor::all().ok()?.into_iter().next())
        .ok_or_else(|| CoreError::Internal("모니터를 찾을 수 없음".to_string()))?;

    let width = monitor
        .width()
        .map_err(|e| CoreError::Internal(format!("모니터 너비 조회 실패: {e}")))?;
    let height = monitor
        .height()
        .map_err(|e| CoreError::Internal(format!("모니터 높이 조회 실패: {e}")))?;

    Ok(Resolution::new(width, height))
}

/// 제목이 정확히 일치하는 창 검색
pub fn find_window(title: &str) -> Result<Option<Window>, CoreError> {
    let windows = Window::all()
        .map_err(|e| CoreError::Internal(format!("창 목록 조회 실패: {e}")))?;

    Ok(windows
        .into_iter()
        .find(|w| w.title().map(|t| t == title).unwrap_or(false)))
}

/// 창 크기 또는 주 모니터 폴백으로 해상도 결정
pub fn resolve(title: &str) -> Result<Resolution, CoreError> {
    if let Some(window) = find_window(title)? {
        let width = window
            .width()
            .map_err(|e| CoreError::Internal(format!("창 너비 조회 실패: {e}")))?;
        let height = window
            .height()
            .map_err(|e| CoreError::Internal(format!("창 높이 조회 실패: {e}")))?;
        debug!("창 크기 사용: {title} → {width}x{height}");
        return Ok(Resolution::new(width, height));
    }

    let resolution = primary_resolution()?;
    debug!("창 없음, 주 모니터 해상도 폴백: {resolution}");
    Ok(resolution)
}
