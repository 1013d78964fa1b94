//! 창 프레임 캡처.
//!
//! `FrameSource` 포트 구현. xcap 기반 — 캡처에 쓰이는 OS 리소스
//! (디바이스 컨텍스트, 비트맵 핸들)는 xcap 내부에서 스코프 단위로
//! 획득/해제되므로 실패 경로 포함 모든 경로에서 반납이 보장된다.

use async_trait::async_trait;
use heistguard_core::error::CoreError;
use heistguard_core::models::geometry::Resolution;
use heistguard_core::ports::capture::FrameSource;
use image::RgbaImage;
use tracing::debug;

use crate::geometry;

/// 창 캡처 — `FrameSource` 포트 구현
pub struct WindowCapture {
    /// 감시 대상 창 제목 (정확히 일치)
    window_title: String,
}

impl WindowCapture {
    /// 새 캡처 인스턴스 생성
    pub fn new(window_title: impl Into<String>) -> Self {
        Self {
            window_title: window_title.into(),
        }
    }
}

#[async_trait]
impl FrameSource for WindowCapture {
    async fn resolve_geometry(&self) -> Result<Resolution, CoreError> {
        geometry::resolve(&self.window_title)
    }

    async fn capture_frame(&self) -> Result<RgbaImage, CoreError> {
        let window = geometry::find_window(&self.window_title)?
            .ok_or_else(|| CoreError::WindowNotFound(self.window_title.clone()))?;

        let image = window
            .capture_image()
            .map_err(|e| CoreError::Capture(format!("{}: {e}", self.window_title)))?;

        debug!("프레임 캡처 완료: {}x{}", image.width(), image.height());

        Ok(image)
    }
}
