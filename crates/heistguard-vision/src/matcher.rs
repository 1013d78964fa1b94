//! 영역 제한 템플릿 매칭.
//!
//! 그레이스케일 정규화 상호상관(zero-mean NCC). 전 영역 완전 탐색은
//! 비용이 크므로 다운샘플 버퍼에서 최고점을 찾은 뒤 원본 해상도에서
//! 그 주변만 재평가하는 coarse-to-fine 2단계로 수행한다. 박스 평균
//! 다운샘플에서 분산을 잃는 고주파 템플릿은 coarse 최고점이
//! 무의미하므로 원본 해상도 완전 탐색으로 폴백한다.
//! 입력이 같으면 점수는 비트 단위로 재현된다 (정수 누산 후
//! 후보당 한 번의 부동소수점 계산).

use heistguard_core::models::geometry::SearchRegion;
use heistguard_core::models::matching::MatchResult;
use image::{GrayImage, RgbaImage};
use tracing::debug;

/// 다운샘플 후 템플릿 최소 치수 (이보다 작아지지 않게 배율 선택)
const COARSE_MIN_TEMPLATE_DIM: u32 = 8;

/// 다운샘플 배율 상한
const COARSE_MAX_FACTOR: u32 = 8;

/// coarse 최고점 인정 하한 — 이하면 원본 해상도 완전 탐색으로 폴백
const COARSE_SCORE_FLOOR: f64 = 0.05;

/// 그레이스케일 버퍼 (소유 벡터 + 치수)
struct GrayBuf {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

/// 프레임의 탐색 영역을 그레이스케일로 잘라낸다.
///
/// 정수 luma 근사: (299·R + 587·G + 114·B) / 1000.
fn rgba_to_gray_region(frame: &RgbaImage, region: SearchRegion) -> GrayBuf {
    let rw = region.width();
    let rh = region.height();
    let raw = frame.as_raw();
    let stride = frame.width() as usize * 4;

    let mut data = Vec::with_capacity((rw * rh) as usize);
    for y in region.y1..region.y2 {
        let row_offset = y as usize * stride;
        for x in region.x1..region.x2 {
            let p = row_offset + x as usize * 4;
            let luma = (299 * raw[p] as u32 + 587 * raw[p + 1] as u32 + 114 * raw[p + 2] as u32)
                / 1000;
            data.push(luma as u8);
        }
    }

    GrayBuf {
        data,
        width: rw,
        height: rh,
    }
}

/// 박스 평균 다운샘플
fn downsample(src: &GrayBuf, factor: u32) -> GrayBuf {
    if factor <= 1 {
        return GrayBuf {
            data: src.data.clone(),
            width: src.width,
            height: src.height,
        };
    }

    let dw = (src.width / factor).max(1);
    let dh = (src.height / factor).max(1);
    let mut data = Vec::with_capacity((dw * dh) as usize);

    for dy in 0..dh {
        for dx in 0..dw {
            let mut sum = 0u32;
            for sy in 0..factor {
                let y = (dy * factor + sy).min(src.height - 1);
                let row = y as usize * src.width as usize;
                for sx in 0..factor {
                    let x = (dx * factor + sx).min(src.width - 1);
                    sum += src.data[row + x as usize] as u32;
                }
            }
            data.push((sum / (factor * factor)) as u8);
        }
    }

    GrayBuf {
        data,
        width: dw,
        height: dh,
    }
}

/// 템플릿 크기에 맞는 다운샘플 배율 (2의 거듭제곱, 최대 8)
fn coarse_factor(tw: u32, th: u32) -> u32 {
    let mut factor = 1;
    while factor * 2 <= COARSE_MAX_FACTOR
        && tw / (factor * 2) >= COARSE_MIN_TEMPLATE_DIM
        && th / (factor * 2) >= COARSE_MIN_TEMPLATE_DIM
    {
        factor *= 2;
    }
    factor
}

/// 한 위치에서의 zero-mean NCC 점수.
///
/// 누산은 전부 i64 정수로 수행하고 마지막에 한 번만 f64로 내린다.
/// 분산이 0인 창(평탄한 프레임/템플릿)은 0.0으로 처리한다.
fn ncc_at(frame: &GrayBuf, tmpl: &GrayBuf, x: u32, y: u32, tmpl_sum: i64, tmpl_sq: i64) -> f64 {
    let tw = tmpl.width as usize;
    let th = tmpl.height as usize;
    let n = (tw * th) as i64;

    let mut sum_f: i64 = 0;
    let mut sum_ff: i64 = 0;
    let mut sum_ft: i64 = 0;

    for ty in 0..th {
        let f_row = (y as usize + ty) * frame.width as usize + x as usize;
        let t_row = ty * tw;
        for tx in 0..tw {
            let f = frame.data[f_row + tx] as i64;
            let t = tmpl.data[t_row + tx] as i64;
            sum_f += f;
            sum_ff += f * f;
            sum_ft += f * t;
        }
    }

    let num = n * sum_ft - sum_f * tmpl_sum;
    let var_f = n * sum_ff - sum_f * sum_f;
    let var_t = n * tmpl_sq - tmpl_sum * tmpl_sum;
    if var_f <= 0 || var_t <= 0 {
        return 0.0;
    }

    let score = num as f64 / ((var_f as f64).sqrt() * (var_t as f64).sqrt());
    score.max(0.0)
}

/// 주어진 좌표 범위를 완전 탐색해 최고 점수 위치를 찾는다
fn best_in_range(
    frame: &GrayBuf,
    tmpl: &GrayBuf,
    x_range: (u32, u32),
    y_range: (u32, u32),
) -> Option<(u32, u32, f64)> {
    if tmpl.width > frame.width || tmpl.height > frame.height {
        return None;
    }

    let tmpl_sum: i64 = tmpl.data.iter().map(|&v| v as i64).sum();
    let tmpl_sq: i64 = tmpl.data.iter().map(|&v| v as i64 * v as i64).sum();

    let x_max = (frame.width - tmpl.width).min(x_range.1);
    let y_max = (frame.height - tmpl.height).min(y_range.1);

    let mut best: Option<(u32, u32, f64)> = None;
    for y in y_range.0..=y_max {
        for x in x_range.0..=x_max {
            let score = ncc_at(frame, tmpl, x, y, tmpl_sum, tmpl_sq);
            if best.map(|(_, _, s)| score > s).unwrap_or(true) {
                best = Some((x, y, score));
            }
        }
    }
    best
}

/// 탐색 영역 안에서 템플릿과 가장 잘 맞는 위치를 찾는다.
///
/// 반환 좌표는 프레임 절대 좌표. 최고 점수가 임계값 미만이면
/// `(-1, -1)` 센티널 미스를 반환한다 (에러 아님). 점수 계산은
/// 임계값과 무관하다.
pub fn match_in_region(
    frame: &RgbaImage,
    template: &GrayImage,
    region: SearchRegion,
    threshold: f64,
) -> MatchResult {
    let region = region.clamped_to(frame.width(), frame.height());
    let tw = template.width();
    let th = template.height();

    if tw == 0 || th == 0 || tw > region.width() || th > region.height() {
        debug!(
            "템플릿({tw}x{th})이 탐색 영역({}x{})에 맞지 않음",
            region.width(),
            region.height()
        );
        return MatchResult::miss(0.0);
    }

    let frame_gray = rgba_to_gray_region(frame, region);
    let tmpl_gray = GrayBuf {
        data: template.as_raw().clone(),
        width: tw,
        height: th,
    };

    // 1단계: 다운샘플 버퍼 완전 탐색. 최고점 점수가 바닥값 이하면
    // (평탄 프레임이거나 템플릿 분산이 다운샘플에서 뭉개진 경우)
    // coarse 위치는 신뢰할 수 없다.
    let factor = coarse_factor(tw, th);
    let coarse_peak = if factor > 1 {
        let frame_coarse = downsample(&frame_gray, factor);
        let tmpl_coarse = downsample(&tmpl_gray, factor);
        best_in_range(
            &frame_coarse,
            &tmpl_coarse,
            (0, frame_coarse.width),
            (0, frame_coarse.height),
        )
        .filter(|&(_, _, score)| score > COARSE_SCORE_FLOOR)
        .map(|(x, y, _)| (x * factor, y * factor))
    } else {
        None
    };

    // 2단계: 원본 해상도에서 coarse 최고점 주변 재평가.
    // 신뢰할 수 있는 최고점이 없으면 전체 영역 완전 탐색으로
    // 최고 점수 위치를 보장한다.
    let (x_range, y_range) = match coarse_peak {
        Some((cx, cy)) => {
            let radius = factor * 2;
            (
                (cx.saturating_sub(radius), cx + radius),
                (cy.saturating_sub(radius), cy + radius),
            )
        }
        None => ((0, frame_gray.width), (0, frame_gray.height)),
    };

    let best = match best_in_range(&frame_gray, &tmpl_gray, x_range, y_range) {
        Some(b) => b,
        None => return MatchResult::miss(0.0),
    };

    let (bx, by, score) = best;
    if score >= threshold {
        MatchResult::hit(region.x1 + bx, region.y1 + by, score)
    } else {
        MatchResult::miss(score)
    }
}
