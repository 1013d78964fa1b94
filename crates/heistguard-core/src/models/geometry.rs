//! 해상도 및 탐색 영역 모델.
//!
//! 탐색 영역은 창(또는 주 모니터) 크기에서 결정적으로 유도된다.
//! 마커 배너는 화면 상단 일정 비율 아래에 나타나므로 세로 구간을
//! `round(H/5.76)`부터 1000px로 제한한다.

use serde::{Deserialize, Serialize};

/// 탐색 영역 세로 시작 비율 분모 (y1 = round(H / 5.76))
const REGION_TOP_DIVISOR: f64 = 5.76;

/// 탐색 영역 세로 크기 (픽셀)
const REGION_HEIGHT: u32 = 1000;

/// 창 또는 모니터 해상도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// 너비 (픽셀)
    pub width: u32,
    /// 높이 (픽셀)
    pub height: u32,
}

impl Resolution {
    /// 새 해상도 생성
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// 프레임 내 탐색 영역 (x1, y1) ~ (x2, y2), 상한 배타적
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRegion {
    /// 좌측 경계
    pub x1: u32,
    /// 상단 경계
    pub y1: u32,
    /// 우측 경계 (배타)
    pub x2: u32,
    /// 하단 경계 (배타)
    pub y2: u32,
}

impl SearchRegion {
    /// 해상도에서 탐색 영역 유도.
    ///
    /// `y1 = round(H / 5.76)`, `y2 = y1 + 1000`. 창이 작으면 프레임
    /// 경계로 클램프하되 `y2 > y1` 불변식은 항상 유지한다.
    pub fn derive(resolution: Resolution) -> Self {
        let h = resolution.height;
        let y1 = ((h as f64) / REGION_TOP_DIVISOR).round() as u32;
        // y1 < h 이므로 (h/5.76는 h보다 항상 작음) 클램프 후에도 y2 > y1
        let y2 = (y1 + REGION_HEIGHT).min(h.max(y1 + 1));
        Self {
            x1: 0,
            y1,
            x2: resolution.width,
            y2,
        }
    }

    /// 영역 너비
    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    /// 영역 높이
    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    /// 주어진 프레임 크기로 추가 클램프 (캡처 순간 창이 줄어든 경우)
    pub fn clamped_to(&self, frame_width: u32, frame_height: u32) -> Self {
        let x2 = self.x2.min(frame_width);
        let y2 = self.y2.min(frame_height);
        Self {
            x1: self.x1.min(x2),
            y1: self.y1.min(y2.saturating_sub(1)),
            x2,
            y2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_matches_formula() {
        // 2560x1440: y1 = round(1440/5.76) = 250
        let region = SearchRegion::derive(Resolution::new(2560, 1440));
        assert_eq!(region, SearchRegion { x1: 0, y1: 250, x2: 2560, y2: 1250 });

        // 1920x1080: y1 = round(1080/5.76) = 188 (187.5 반올림)
        let region = SearchRegion::derive(Resolution::new(1920, 1080));
        assert_eq!(region.y1, 188);
        assert_eq!(region.y2, 1080); // 188 + 1000 > 1080 → 클램프
        assert_eq!(region.x2, 1920);
    }

    #[test]
    fn y2_always_exceeds_y1() {
        for (w, h) in [(2560, 1440), (1920, 1080), (1280, 720), (800, 600), (320, 200)] {
            let region = SearchRegion::derive(Resolution::new(w, h));
            assert!(region.y2 > region.y1, "{}x{}: {:?}", w, h, region);
        }
    }

    #[test]
    fn clamp_to_smaller_frame() {
        let region = SearchRegion::derive(Resolution::new(2560, 1440));
        let clamped = region.clamped_to(1280, 720);
        assert_eq!(clamped.x2, 1280);
        assert_eq!(clamped.y2, 720);
        assert!(clamped.y2 > clamped.y1);
    }
}
