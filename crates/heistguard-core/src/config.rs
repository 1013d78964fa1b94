//! 애플리케이션 설정 구조체.
//!
//! 감시 대상 창, 폴링 주기, 템플릿 경로, 완화 액션 파라미터 등
//! 런타임 설정을 정의한다. JSON 파일에서 로드하며 CLI 플래그가 덮어쓴다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;
use crate::models::worker::MitigationAction;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 감시(탐지 루프) 설정
    pub watch: WatchConfig,
    /// 비전(템플릿 매칭) 설정
    pub vision: VisionConfig,
    /// 완화 액션 설정
    #[serde(default)]
    pub action: ActionConfig,
}

/// 감시 설정 — 대상 창과 폴링 주기
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// 감시 대상 창 제목 (정확히 일치)
    #[serde(default = "default_window_title")]
    pub window_title: String,
    /// 캡처 폴링 간격 (밀리초)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// 히트 후 액션 실행 전 안정화 대기 (밀리초)
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// 루프 모드 — 액션 후 사이클을 처음부터 재시작
    #[serde(default)]
    pub loop_mode: bool,
}

/// 비전 설정 — 마커 템플릿과 매칭 임계값
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// 마커 원본 이미지 경로
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,
    /// 스케일된 템플릿 캐시 디렉토리 (미지정 시 원본 옆에 저장)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// 마커 기준 해상도 너비 (픽셀)
    #[serde(default = "default_baseline_width")]
    pub baseline_width: u32,
    /// 매칭 히트 임계값 (0.0 ~ 1.0)
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
}

/// 완화 액션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionConfig {
    /// 실행할 완화 액션
    #[serde(default)]
    pub kind: MitigationAction,
    /// 종료 대상 프로세스 이름 접두사
    #[serde(default = "default_process_prefix")]
    pub process_prefix: String,
    /// 네트워크 차단 유지 시간 (초)
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// 전환 제외 인터페이스 이름 접두사 (소문자 비교)
    #[serde(default = "default_excluded_interface_prefixes")]
    pub excluded_interface_prefixes: Vec<String>,
}

fn default_window_title() -> String {
    "Grand Theft Auto V".to_string()
}

fn default_poll_interval_ms() -> u64 {
    200
}

fn default_settle_delay_ms() -> u64 {
    600
}

fn default_template_path() -> PathBuf {
    PathBuf::from("assets/heist_passed.png")
}

fn default_baseline_width() -> u32 {
    2560
}

fn default_match_threshold() -> f64 {
    0.7
}

fn default_process_prefix() -> String {
    "GTA5".to_string()
}

fn default_cooldown_secs() -> u64 {
    20
}

fn default_excluded_interface_prefixes() -> Vec<String> {
    vec!["loopback".to_string(), "local".to_string(), "lo".to_string()]
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            kind: MitigationAction::default(),
            process_prefix: default_process_prefix(),
            cooldown_secs: default_cooldown_secs(),
            excluded_interface_prefixes: default_excluded_interface_prefixes(),
        }
    }
}

impl AppConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self {
            watch: WatchConfig {
                window_title: default_window_title(),
                poll_interval_ms: default_poll_interval_ms(),
                settle_delay_ms: default_settle_delay_ms(),
                loop_mode: false,
            },
            vision: VisionConfig {
                template_path: default_template_path(),
                cache_dir: None,
                baseline_width: default_baseline_width(),
                match_threshold: default_match_threshold(),
            },
            action: ActionConfig::default(),
        }
    }

    /// 설정값 유효성 검증.
    ///
    /// 워커 시작 전에 호출한다. 임계값 범위, 폴링 간격 0 여부,
    /// 기준 너비 0 여부를 검사한다.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(0.0..=1.0).contains(&self.vision.match_threshold) {
            return Err(CoreError::Config(format!(
                "match_threshold는 0.0~1.0 범위여야 함: {}",
                self.vision.match_threshold
            )));
        }
        if self.watch.poll_interval_ms == 0 {
            return Err(CoreError::Config("poll_interval_ms는 0일 수 없음".to_string()));
        }
        if self.vision.baseline_width == 0 {
            return Err(CoreError::Config("baseline_width는 0일 수 없음".to_string()));
        }
        if self.action.process_prefix.is_empty() {
            return Err(CoreError::Config("process_prefix가 비어 있음".to_string()));
        }
        Ok(())
    }

    /// 폴링 간격을 Duration으로
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.watch.poll_interval_ms)
    }

    /// 안정화 대기를 Duration으로
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.watch.settle_delay_ms)
    }

    /// 네트워크 차단 유지 시간을 Duration으로
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.action.cooldown_secs)
    }
}
