//! PostgreSQL 저장소.
//!
//! - [`krx`]: 시장 스냅샷/시세 이력 조회
//! - [`users`]: 사용자 계정
//! - [`widgets`]: 대시보드 위젯 CRUD

pub mod krx;
pub mod users;
pub mod widgets;
