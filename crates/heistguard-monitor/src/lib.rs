//! # heistguard-monitor
//!
//! OS 어댑터 크레이트.
//! 프로세스 조회/종료(sysinfo), 네트워크 인터페이스 열거/전환
//! (sysinfo + 플랫폼 셸 도구), 관리자 권한 확인을 담당한다.

pub mod network;
pub mod privilege;
pub mod process;
