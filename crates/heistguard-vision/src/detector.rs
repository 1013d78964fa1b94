//! 폴링 탐지 루프.
//!
//! 캡처 → 매칭을 고정 주기로 반복한다. 창 미발견/캡처 실패는
//! 해당 틱의 미스로 흡수되어 루프 밖으로 나가지 않는다.
//! 루프는 히트 또는 협조적 취소로만 끝난다. 시도 횟수 제한 없음.

use std::sync::Arc;
use std::time::Duration;

use heistguard_core::error::CoreError;
use heistguard_core::models::geometry::SearchRegion;
use heistguard_core::models::matching::MatchResult;
use heistguard_core::ports::capture::FrameSource;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

use crate::matcher;
use crate::template::ScaledTemplate;

/// 탐지 루프 — 한 사이클 동안 불변인 파라미터 묶음
pub struct DetectionLoop {
    frame_source: Arc<dyn FrameSource>,
    template: ScaledTemplate,
    region: SearchRegion,
    threshold: f64,
    poll_interval: Duration,
}

impl DetectionLoop {
    /// 새 탐지 루프 생성
    pub fn new(
        frame_source: Arc<dyn FrameSource>,
        template: ScaledTemplate,
        region: SearchRegion,
        threshold: f64,
        poll_interval: Duration,
    ) -> Self {
        Self {
            frame_source,
            template,
            region,
            threshold,
            poll_interval,
        }
    }

    /// 히트가 나올 때까지 폴링.
    ///
    /// 반환값이 `Some`이면 항상 히트다 — 센티널 `(-1, -1)`은 틱 단위
    /// 중간 상태일 뿐 최종 반환값이 되지 않는다. 취소 시 `None`.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) -> Option<MatchResult> {
        let mut attempt: u64 = 0;

        loop {
            if *cancel.borrow() {
                debug!("탐지 루프 취소 (시도 {attempt}회)");
                return None;
            }

            attempt += 1;
            match self.frame_source.capture_frame().await {
                Ok(frame) => {
                    let result = matcher::match_in_region(
                        &frame,
                        &self.template.gray,
                        self.region,
                        self.threshold,
                    );
                    if result.is_hit() {
                        debug!(
                            "히트: ({}, {}) score={:.3} (시도 {attempt}회)",
                            result.x, result.y, result.score
                        );
                        return Some(result);
                    }
                    trace!("미스: score={:.3} (시도 {attempt}회)", result.score);
                }
                Err(CoreError::WindowNotFound(title)) => {
                    // 창이 아직 없거나 사라짐 → 이번 틱은 미스
                    trace!("창 미발견, 재시도: {title}");
                }
                Err(e) => {
                    // 그 외 캡처 에러도 루프에 치명적이지 않다
                    warn!("캡처 에러 (재시도): {e}");
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        debug!("탐지 루프 취소 (대기 중, 시도 {attempt}회)");
                        return None;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use heistguard_core::models::geometry::Resolution;
    use image::{GrayImage, Rgba, RgbaImage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 폴링 회차별로 스크립트된 결과를 돌려주는 프레임 소스
    struct ScriptedSource {
        calls: AtomicUsize,
        /// 회차별 결과 (마지막 항목은 이후 계속 반복)
        script: Vec<ScriptedFrame>,
    }

    enum ScriptedFrame {
        Missing,
        Flat,
        WithTemplate,
    }

    fn test_template() -> GrayImage {
        GrayImage::from_fn(32, 16, |x, y| image::Luma([((x * 11 + y * 17) % 240) as u8]))
    }

    fn frame_with_template(template: &GrayImage) -> RgbaImage {
        let mut frame = RgbaImage::from_pixel(200, 150, Rgba([30, 30, 30, 255]));
        for (tx, ty, p) in template.enumerate_pixels() {
            let v = p.0[0];
            frame.put_pixel(80 + tx, 60 + ty, Rgba([v, v, v, 255]));
        }
        frame
    }

    #[async_trait]
    impl FrameSource for ScriptedSource {
        async fn resolve_geometry(&self) -> Result<Resolution, CoreError> {
            Ok(Resolution::new(200, 150))
        }

        async fn capture_frame(&self) -> Result<RgbaImage, CoreError> {
            let idx = self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.script.get(idx).unwrap_or(self.script.last().unwrap());
            match step {
                ScriptedFrame::Missing => {
                    Err(CoreError::WindowNotFound("Grand Theft Auto V".into()))
                }
                ScriptedFrame::Flat => {
                    Ok(RgbaImage::from_pixel(200, 150, Rgba([30, 30, 30, 255])))
                }
                ScriptedFrame::WithTemplate => Ok(frame_with_template(&test_template())),
            }
        }
    }

    fn make_loop(script: Vec<ScriptedFrame>) -> (DetectionLoop, Arc<ScriptedSource>) {
        let source = Arc::new(ScriptedSource {
            calls: AtomicUsize::new(0),
            script,
        });
        let template = ScaledTemplate {
            gray: test_template(),
            target_width: 200,
        };
        let region = SearchRegion { x1: 0, y1: 0, x2: 200, y2: 150 };
        let detector = DetectionLoop::new(
            source.clone(),
            template,
            region,
            0.7,
            Duration::from_millis(1),
        );
        (detector, source)
    }

    #[tokio::test]
    async fn window_absent_then_hit_on_fourth_poll() {
        let (detector, source) = make_loop(vec![
            ScriptedFrame::Missing,
            ScriptedFrame::Missing,
            ScriptedFrame::Missing,
            ScriptedFrame::WithTemplate,
        ]);
        let (_tx, rx) = watch::channel(false);

        let result = detector.run(rx).await.expect("히트로 종료해야 함");
        assert!(result.is_hit());
        assert_ne!((result.x, result.y), (-1, -1));
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn flat_frames_keep_polling_until_hit() {
        let (detector, source) = make_loop(vec![
            ScriptedFrame::Flat,
            ScriptedFrame::Flat,
            ScriptedFrame::WithTemplate,
        ]);
        let (_tx, rx) = watch::channel(false);

        let result = detector.run(rx).await.unwrap();
        assert!(result.is_hit());
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn cancellation_returns_none() {
        let (detector, _source) = make_loop(vec![ScriptedFrame::Missing]);
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(async move { detector.run(rx).await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        tx.send(true).unwrap();

        let result = handle.await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn already_cancelled_never_captures() {
        let (detector, source) = make_loop(vec![ScriptedFrame::WithTemplate]);
        let (_tx, rx) = watch::channel(true);

        let result = detector.run(rx).await;
        assert!(result.is_none());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
