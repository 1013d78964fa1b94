//! Hexagonal Architecture 포트 정의.
//!
//! 워커/디스패처는 이 trait들만 바라보며, OS 어댑터 구현은
//! `heistguard-vision`, `heistguard-monitor` crate에 있다.
//! 테스트에서는 인메모리 페이크로 대체한다.

pub mod capture;
pub mod network;
pub mod process;
