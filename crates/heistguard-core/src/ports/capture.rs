//! 프레임 캡처 포트.
//!
//! 구현: `heistguard-vision` crate (xcap)

use async_trait::async_trait;
use image::RgbaImage;

use crate::error::CoreError;
use crate::models::geometry::Resolution;

/// 대상 창 프레임 공급자.
///
/// 대상 창 제목은 구현체 생성 시 고정된다. 프레임은 호출 한 번당
/// 하나씩 소유권째 반환되며 구현체가 캐시하지 않는다.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// 대상 창의 클라이언트 영역 크기 조회.
    ///
    /// 창이 없으면 주 모니터 해상도로 폴백한다. 창 부재는
    /// 정상 경로이며 에러가 아니다.
    async fn resolve_geometry(&self) -> Result<Resolution, CoreError>;

    /// 대상 창 프레임 한 장 캡처.
    ///
    /// 창이 없으면 `CoreError::WindowNotFound`, 그 외 캡처 실패는
    /// `CoreError::Capture`. 둘 다 탐지 루프 안에서 흡수된다.
    async fn capture_frame(&self) -> Result<RgbaImage, CoreError>;
}
