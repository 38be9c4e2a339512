//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness / readiness)
//! - `/api/charts` - 트리맵, 시세 이력 차트
//! - `/api/market` - 랭킹 (일반, Top & Bottom)
//! - `/api/market-data` - 원본 스냅샷 레코드
//! - `/api/dashboard` - dynamic-data 번들
//! - `/api/stocks` - 종목 검색, 시세
//! - `/api/users`, `/api/user` - 회원가입/로그인/내 정보
//! - `/api/widgets` - 위젯 CRUD (인증 필요)

pub mod charts;
pub mod dashboard;
pub mod health;
pub mod market;
pub mod stocks;
pub mod users;
pub mod widgets;

pub use charts::charts_router;
pub use dashboard::{dashboard_router, DynamicDataRequest};
pub use health::{health_router, ComponentStatus, HealthResponse};
pub use market::{market_router, RankQuery, TopAndBottomQuery};
pub use stocks::{stocks_router, QuotesQuery, SearchQuery};
pub use users::{users_router, LoginRequest, RegisterRequest, UserProfileResponse};
pub use widgets::widgets_router;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // 대시보드 API
        .nest("/api/charts", charts_router())
        .nest("/api/market", market_router())
        .nest("/api/dashboard", dashboard_router())
        .nest("/api/stocks", stocks_router())
        .nest("/api/users", users_router())
        .nest("/api/widgets", widgets_router())
        // 경로 호환용 단독 라우트
        .route("/api/market-data", get(dashboard::get_market_data))
        .route("/api/user", get(users::get_current_user))
}
