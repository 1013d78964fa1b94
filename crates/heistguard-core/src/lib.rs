//! # heistguard-core
//!
//! heistguard 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`] — 도메인 데이터 구조체 (탐색 영역, 매칭 결과, 워커 상태)
//! - [`ports`] — Hexagonal Architecture 포트 인터페이스 (async_trait)
//! - [`error`] — 핵심 에러 타입 (thiserror)
//! - [`config`] — 애플리케이션 설정 구조체
//! - [`config_manager`] — 설정 파일 관리 (로드/저장)

pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;

#[cfg(test)]
mod tests {
    use crate::models::worker::MitigationAction;

    #[test]
    fn config_defaults() {
        let config = crate::config::AppConfig::default_config();
        assert_eq!(config.watch.window_title, "Grand Theft Auto V");
        assert_eq!(config.watch.poll_interval_ms, 200);
        assert_eq!(config.watch.settle_delay_ms, 600);
        assert!((config.vision.match_threshold - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.vision.baseline_width, 2560);
        assert_eq!(config.action.process_prefix, "GTA5");
        assert_eq!(config.action.cooldown_secs, 20);
        assert!(!config.watch.loop_mode);
    }

    #[test]
    fn action_serde_roundtrip() {
        let json = serde_json::to_string(&MitigationAction::DisableNetwork).unwrap();
        let back: MitigationAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, MitigationAction::DisableNetwork);
    }
}
