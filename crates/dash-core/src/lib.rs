//! # Dash Core
//!
//! KRX 대시보드 백엔드의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 시장 스냅샷 레코드 (종목별 시세/시가총액/섹터)
//! - 트리맵 계층 구조 (시장 → 섹터 → 종목)
//! - 랭킹 항목 및 정렬 기준
//! - 캐시 엔트리 값 (tagged union)
//! - 공통 에러 타입
//! - 로깅 인프라

pub mod domain;
pub mod error;
pub mod logging;

pub use domain::*;
pub use error::*;
pub use logging::*;
