//! 시장 뷰 파이프라인.
//!
//! 주기적으로 시장 스냅샷을 읽어 트리맵/랭킹/지수 뷰로 변환하고
//! 읽기 전용 캐시에 게시합니다. API 계층은 이 캐시만 바라보므로
//! 요청 경로에서 DB를 건드리지 않습니다.

pub mod cache;
pub mod keys;
pub mod refresh;
pub mod service;
pub mod transform;

pub use cache::MarketViewCache;
pub use refresh::{run_refresh_cycle, start_refresher, RefreshConfig};
pub use service::DashboardService;
