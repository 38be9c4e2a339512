//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use dash_data::MarketDataSource;
use dash_market::{DashboardService, MarketViewCache};

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 데이터베이스 연결 풀 (PostgreSQL)
    pub db_pool: PgPool,

    /// 시장 스냅샷 데이터 소스 (검색/이력/시세 조회용)
    pub market_source: Arc<dyn MarketDataSource>,

    /// 캐시 기반 대시보드 조회 파사드
    pub dashboard: DashboardService,

    /// JWT 서명 비밀 키
    pub jwt_secret: String,

    /// 종료 시그널 토큰 (백그라운드 태스크 공유)
    pub shutdown_token: CancellationToken,

    /// 서버 기동 시각 (업타임 계산용)
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// 새 상태를 생성합니다.
    pub fn new(
        db_pool: PgPool,
        market_source: Arc<dyn MarketDataSource>,
        cache: Arc<MarketViewCache>,
        jwt_secret: impl Into<String>,
        shutdown_token: CancellationToken,
    ) -> Self {
        Self {
            db_pool,
            market_source,
            dashboard: DashboardService::new(cache),
            jwt_secret: jwt_secret.into(),
            shutdown_token,
            started_at: Utc::now(),
        }
    }

    /// 데이터베이스가 응답하는지 확인합니다.
    pub async fn is_db_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.db_pool).await.is_ok()
    }

    /// 캐시에 게시된 뷰 수를 반환합니다.
    pub async fn cache_entry_count(&self) -> usize {
        self.dashboard.cache().len().await
    }

    /// 서버 업타임(초)을 반환합니다.
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
