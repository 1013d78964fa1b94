//! 네트워크 인터페이스 열거 및 전환.
//!
//! `InterfaceController` 포트 구현. 열거는 sysinfo, 작동 상태
//! 확인과 전환은 플랫폼 도구(netsh / ip link / networksetup)에
//! 위임한다.
//! 전환에는 관리자(root) 권한이 필요하다 — [`crate::privilege`] 참고.

use async_trait::async_trait;
use heistguard_core::error::CoreError;
use heistguard_core::ports::network::InterfaceController;
use std::process::Command;
use sysinfo::Networks;
use tracing::{debug, info};

/// 인터페이스 전환기 — `InterfaceController` 포트 구현
pub struct InterfaceToggle {
    /// 열거에서 제외할 인터페이스 이름 접두사 (소문자 비교)
    excluded_prefixes: Vec<String>,
    /// 인터페이스 작동 상태 조회 (down이면 false)
    state_probe: fn(&str) -> bool,
}

impl InterfaceToggle {
    /// 새 전환기 생성
    pub fn new(excluded_prefixes: Vec<String>) -> Self {
        Self {
            excluded_prefixes: excluded_prefixes
                .into_iter()
                .map(|p| p.to_lowercase())
                .collect(),
            state_probe: platform_interface_up,
        }
    }

    #[cfg(test)]
    fn with_state_probe(excluded_prefixes: Vec<String>, state_probe: fn(&str) -> bool) -> Self {
        let mut toggle = Self::new(excluded_prefixes);
        toggle.state_probe = state_probe;
        toggle
    }

    /// 루프백/가상 인터페이스 제외 필터
    fn is_excluded(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.excluded_prefixes.iter().any(|p| lower.starts_with(p))
    }

    /// 제외 접두사와 작동 상태 필터를 적용해 스냅샷 목록을 만든다.
    ///
    /// 차단 시작 전에 이미 내려가 있던 인터페이스는 스냅샷에
    /// 들어가지 않으므로 복원 단계에서 강제로 켜지지 않는다.
    fn snapshot_filter(&self, names: impl IntoIterator<Item = String>) -> Vec<String> {
        let mut names: Vec<String> = names
            .into_iter()
            .filter(|name| !self.is_excluded(name) && (self.state_probe)(name))
            .collect();
        names.sort();
        names
    }

    /// 플랫폼 전환 명령 실행
    fn run_toggle_command(name: &str, enabled: bool) -> Result<(), CoreError> {
        let mut command = toggle_command(name, enabled);
        let output = command.output().map_err(|e| CoreError::InterfaceToggle {
            name: name.to_string(),
            message: format!("명령 실행 실패: {e}"),
        })?;

        if !output.status.success() {
            return Err(CoreError::InterfaceToggle {
                name: name.to_string(),
                message: format!(
                    "exit {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(())
    }
}

/// 플랫폼별 인터페이스 전환 명령 구성
fn toggle_command(name: &str, enabled: bool) -> Command {
    #[cfg(target_os = "windows")]
    {
        let mut cmd = Command::new("netsh");
        cmd.args([
            "interface",
            "set",
            "interface",
            name,
            if enabled { "enabled" } else { "disabled" },
        ]);
        cmd
    }
    #[cfg(target_os = "macos")]
    {
        let mut cmd = Command::new("networksetup");
        cmd.args([
            "-setnetworkserviceenabled",
            name,
            if enabled { "on" } else { "off" },
        ]);
        cmd
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let mut cmd = Command::new("ip");
        cmd.args(["link", "set", name, if enabled { "up" } else { "down" }]);
        cmd
    }
}

/// 플랫폼별 인터페이스 작동 상태 조회.
///
/// sysinfo 열거는 down 상태 인터페이스도 포함하므로 스냅샷에
/// 넣기 전에 상태를 따로 확인한다. 조회 실패는 down으로 취급한다.
fn platform_interface_up(name: &str) -> bool {
    #[cfg(target_os = "windows")]
    {
        Command::new("netsh")
            .args(["interface", "show", "interface", &format!("name={name}")])
            .output()
            .map(|o| o.status.success() && !String::from_utf8_lossy(&o.stdout).contains("Disabled"))
            .unwrap_or(false)
    }
    #[cfg(target_os = "macos")]
    {
        Command::new("networksetup")
            .args(["-getnetworkserviceenabled", name])
            .output()
            .map(|o| String::from_utf8_lossy(&o.stdout).contains("Enabled"))
            .unwrap_or(false)
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        std::fs::read_to_string(format!("/sys/class/net/{name}/operstate"))
            .map(|state| state.trim() != "down")
            .unwrap_or(false)
    }
}

#[async_trait]
impl InterfaceController for InterfaceToggle {
    async fn enabled_interfaces(&self) -> Result<Vec<String>, CoreError> {
        let networks = Networks::new_with_refreshed_list();
        let names = self.snapshot_filter(networks.iter().map(|(name, _)| name.clone()));

        debug!("활성 인터페이스 {}개: {:?}", names.len(), names);
        Ok(names)
    }

    async fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), CoreError> {
        Self::run_toggle_command(name, enabled)?;
        info!(
            "{} 인터페이스: {name}",
            if enabled { "재활성화" } else { "비활성화" }
        );
        Ok(())
    }
}
