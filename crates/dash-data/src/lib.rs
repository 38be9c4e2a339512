//! 데이터 접근 계층.
//!
//! 이 crate는 다음을 제공합니다:
//! - 시장 스냅샷 데이터 소스 trait 및 PostgreSQL 구현
//! - KRX 지수 피드 클라이언트 (외부 HTTP)
//! - 사용자/위젯 저장소 (대시보드 CRUD)

pub mod error;
pub mod provider;
pub mod source;
pub mod storage;

pub use error::{DataError, Result};
pub use provider::index_feed::KrxIndexFeed;
pub use source::{IndexFeed, MarketDataSource};
pub use storage::krx::KrxMarketStore;
pub use storage::users::{NewUser, UserRecord, UserStore};
pub use storage::widgets::{NewWidget, UpdateWidget, WidgetRecord, WidgetStore};
