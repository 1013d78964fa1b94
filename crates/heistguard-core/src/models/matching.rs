//! 템플릿 매칭 결과 모델.

use serde::{Deserialize, Serialize};

/// 미스 좌표 센티널
const MISS_COORD: i32 = -1;

/// 한 번의 매칭 시도 결과.
///
/// `(-1, -1, score)`는 "이번 시도에서 임계값 이상 매칭 없음"을
/// 뜻하는 센티널이며 에러가 아니다. 탐지 루프의 최종 반환값으로는
/// 절대 쓰이지 않는다 (루프는 히트 또는 취소로만 끝난다).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// 최고 점수 위치 x (프레임 좌표, 미스 시 -1)
    pub x: i32,
    /// 최고 점수 위치 y (프레임 좌표, 미스 시 -1)
    pub y: i32,
    /// 최고 매칭 점수 (0.0 ~ 1.0)
    pub score: f64,
}

impl MatchResult {
    /// 히트 결과 생성
    pub fn hit(x: u32, y: u32, score: f64) -> Self {
        Self {
            x: x as i32,
            y: y as i32,
            score,
        }
    }

    /// 미스 센티널 생성 (최고 점수는 관측값 그대로 유지)
    pub fn miss(score: f64) -> Self {
        Self {
            x: MISS_COORD,
            y: MISS_COORD,
            score,
        }
    }

    /// 임계값 이상 매칭 여부
    pub fn is_hit(&self) -> bool {
        self.x != MISS_COORD && self.y != MISS_COORD
    }
}
