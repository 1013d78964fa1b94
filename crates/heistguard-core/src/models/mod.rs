//! 도메인 데이터 모델.

pub mod geometry;
pub mod matching;
pub mod worker;
