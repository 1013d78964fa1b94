//! 액션 디스패처 에러 경로 테스트.
//!
//! 프로세스 미발견, 인터페이스 단위 실패, 쿨다운 중 취소 등
//! 흡수-후-로그 정책과 스냅샷 복원 불변식을 검증한다.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use heistguard_app::dispatch::ActionDispatcher;
use heistguard_core::config::ActionConfig;
use heistguard_core::error::CoreError;
use heistguard_core::models::worker::MitigationAction;
use heistguard_core::ports::network::InterfaceController;
use heistguard_core::ports::process::{ProcessController, ProcessMatch};
use tokio::sync::watch;

struct FakeProcess {
    found: Option<ProcessMatch>,
    terminate_fails: bool,
    terminated: Mutex<Vec<u32>>,
}

#[async_trait]
impl ProcessController for FakeProcess {
    async fn find_by_prefix(&self, _prefix: &str) -> Result<Option<ProcessMatch>, CoreError> {
        Ok(self.found.clone())
    }

    async fn terminate(&self, pid: u32) -> Result<(), CoreError> {
        self.terminated.lock().unwrap().push(pid);
        if self.terminate_fails {
            return Err(CoreError::Internal("권한 거부".to_string()));
        }
        Ok(())
    }
}

struct FakeNetwork {
    /// 열거 호출별 반환값 (호출마다 하나씩 소비, 소진 시 마지막 반복)
    enumerations: Mutex<Vec<Vec<String>>>,
    enumerate_calls: Mutex<u32>,
    /// set_enabled가 실패할 인터페이스 이름
    failing: Vec<String>,
    toggles: Mutex<Vec<(String, bool)>>,
}

impl FakeNetwork {
    fn new(enumerations: Vec<Vec<String>>, failing: Vec<String>) -> Self {
        Self {
            enumerations: Mutex::new(enumerations),
            enumerate_calls: Mutex::new(0),
            failing,
            toggles: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl InterfaceController for FakeNetwork {
    async fn enabled_interfaces(&self) -> Result<Vec<String>, CoreError> {
        *self.enumerate_calls.lock().unwrap() += 1;
        let mut scripts = self.enumerations.lock().unwrap();
        if scripts.len() > 1 {
            Ok(scripts.remove(0))
        } else {
            Ok(scripts[0].clone())
        }
    }

    async fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), CoreError> {
        self.toggles.lock().unwrap().push((name.to_string(), enabled));
        if self.failing.iter().any(|f| f == name) {
            return Err(CoreError::InterfaceToggle {
                name: name.to_string(),
                message: "exit 1".to_string(),
            });
        }
        Ok(())
    }
}

fn config_with_cooldown(secs: u64) -> ActionConfig {
    ActionConfig {
        cooldown_secs: secs,
        ..ActionConfig::default()
    }
}

fn make_dispatcher(
    process: Arc<FakeProcess>,
    network: Arc<FakeNetwork>,
    cooldown_secs: u64,
) -> ActionDispatcher {
    ActionDispatcher::new(process, network, config_with_cooldown(cooldown_secs))
}

fn no_process() -> Arc<FakeProcess> {
    Arc::new(FakeProcess {
        found: None,
        terminate_fails: false,
        terminated: Mutex::new(Vec::new()),
    })
}

fn empty_network() -> Arc<FakeNetwork> {
    Arc::new(FakeNetwork::new(vec![vec![]], vec![]))
}

#[tokio::test]
async fn kill_process_not_found_is_absorbed() {
    let process = no_process();
    let dispatcher = make_dispatcher(process.clone(), empty_network(), 0);
    let (_tx, rx) = watch::channel(false);

    dispatcher.dispatch(MitigationAction::KillProcess, rx).await;

    assert!(process.terminated.lock().unwrap().is_empty());
}

#[tokio::test]
async fn kill_process_terminates_found_pid() {
    let process = Arc::new(FakeProcess {
        found: Some(ProcessMatch {
            pid: 777,
            name: "GTA5.exe".to_string(),
        }),
        terminate_fails: false,
        terminated: Mutex::new(Vec::new()),
    });
    let dispatcher = make_dispatcher(process.clone(), empty_network(), 0);
    let (_tx, rx) = watch::channel(false);

    dispatcher.dispatch(MitigationAction::KillProcess, rx).await;

    assert_eq!(*process.terminated.lock().unwrap(), vec![777]);
}

#[tokio::test]
async fn kill_failure_does_not_panic() {
    let process = Arc::new(FakeProcess {
        found: Some(ProcessMatch {
            pid: 778,
            name: "GTA5.exe".to_string(),
        }),
        terminate_fails: true,
        terminated: Mutex::new(Vec::new()),
    });
    let dispatcher = make_dispatcher(process.clone(), empty_network(), 0);
    let (_tx, rx) = watch::channel(false);

    // 종료 실패는 로그로만 보고 — dispatch는 정상 반환
    dispatcher.dispatch(MitigationAction::KillProcess, rx).await;
    assert_eq!(process.terminated.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn restore_uses_initial_snapshot_only() {
    // 두 번째 열거는 다른 목록을 돌려주지만 복원은 첫 스냅샷만 따른다
    let network = Arc::new(FakeNetwork::new(
        vec![
            vec!["eth0".to_string(), "wlan0".to_string()],
            vec!["eth1".to_string()],
        ],
        vec![],
    ));
    let dispatcher = make_dispatcher(no_process(), network.clone(), 0);
    let (_tx, rx) = watch::channel(false);

    dispatcher.dispatch(MitigationAction::DisableNetwork, rx).await;

    assert_eq!(*network.enumerate_calls.lock().unwrap(), 1);
    let toggles = network.toggles.lock().unwrap().clone();
    assert_eq!(
        toggles,
        vec![
            ("eth0".to_string(), false),
            ("wlan0".to_string(), false),
            ("eth0".to_string(), true),
            ("wlan0".to_string(), true),
        ]
    );
}

#[tokio::test]
async fn interface_failure_does_not_abort_remaining() {
    let network = Arc::new(FakeNetwork::new(
        vec![vec!["eth0".to_string(), "wlan0".to_string()]],
        vec!["eth0".to_string()],
    ));
    let dispatcher = make_dispatcher(no_process(), network.clone(), 0);
    let (_tx, rx) = watch::channel(false);

    dispatcher.dispatch(MitigationAction::DisableNetwork, rx).await;

    // eth0 실패에도 wlan0 비활성화와 양쪽 복원 시도가 모두 수행된다
    let toggles = network.toggles.lock().unwrap().clone();
    assert_eq!(toggles.len(), 4);
    assert!(toggles.contains(&("wlan0".to_string(), false)));
    assert!(toggles.contains(&("eth0".to_string(), true)));
    assert!(toggles.contains(&("wlan0".to_string(), true)));
}

#[tokio::test]
async fn cancel_during_cooldown_still_restores() {
    let network = Arc::new(FakeNetwork::new(vec![vec!["eth0".to_string()]], vec![]));
    let dispatcher = Arc::new(make_dispatcher(no_process(), network.clone(), 30));
    let (tx, rx) = watch::channel(false);

    let task = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            dispatcher.dispatch(MitigationAction::DisableNetwork, rx).await;
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("취소 후에도 디스패치가 제때 끝나야 함")
        .unwrap();

    // 30초 쿨다운을 기다리지 않고 복원이 수행됐다
    let toggles = network.toggles.lock().unwrap().clone();
    assert_eq!(
        toggles,
        vec![("eth0".to_string(), false), ("eth0".to_string(), true)]
    );
}

#[tokio::test]
async fn spurious_wakeup_does_not_shorten_cooldown() {
    let network = Arc::new(FakeNetwork::new(vec![vec!["eth0".to_string()]], vec![]));
    let dispatcher = Arc::new(make_dispatcher(no_process(), network.clone(), 1));
    let (tx, rx) = watch::channel(false);

    let started = std::time::Instant::now();
    let task = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            dispatcher.dispatch(MitigationAction::DisableNetwork, rx).await;
        })
    };

    // 취소값 없는 채널 웨이크업 연타 — 카운트다운이 깎이면 안 된다
    for _ in 0..5 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = tx.send(false);
    }

    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("쿨다운이 제때 끝나야 함")
        .unwrap();

    assert!(started.elapsed() >= Duration::from_secs(1));
    let toggles = network.toggles.lock().unwrap().clone();
    assert_eq!(
        toggles,
        vec![("eth0".to_string(), false), ("eth0".to_string(), true)]
    );
}

#[tokio::test]
async fn empty_snapshot_toggles_nothing() {
    let network = empty_network();
    let dispatcher = make_dispatcher(no_process(), network.clone(), 0);
    let (_tx, rx) = watch::channel(false);

    dispatcher.dispatch(MitigationAction::DisableNetwork, rx).await;

    assert!(network.toggles.lock().unwrap().is_empty());
}
