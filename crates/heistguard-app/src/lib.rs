//! # heistguard-app
//!
//! 워커 오케스트레이션 레이어.
//! 탐지 루프 + 액션 디스패처를 하나의 취소 가능한 작업 단위로 묶고,
//! 제어 표면에는 start/stop/set_action과 상태 관측만 노출한다.
//! 바이너리 진입점은 `main.rs`.

pub mod dispatch;
pub mod worker;
