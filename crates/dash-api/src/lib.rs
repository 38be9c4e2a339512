//! 대시보드 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - JWT 인증 및 사용자/위젯 관리
//! - 헬스 체크 엔드포인트
//! - OpenAPI 문서 (Swagger UI)
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: JWT 토큰 발급/검증 및 비밀번호 해시
//! - [`error`]: 통합 API 에러 응답
//! - [`openapi`]: OpenAPI 스펙 및 Swagger UI

pub mod auth;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

pub use error::{ApiErrorResponse, ApiResult};
pub use routes::create_api_router;
pub use state::AppState;
