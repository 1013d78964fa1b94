//! # heistguard-vision
//!
//! 탐지 엔진 크레이트.
//! 창/모니터 캡처, 마커 템플릿 스케일링, 영역 제한 템플릿 매칭,
//! 폴링 탐지 루프를 담당한다.

pub mod capture;
pub mod detector;
pub mod geometry;
pub mod matcher;
pub mod template;
