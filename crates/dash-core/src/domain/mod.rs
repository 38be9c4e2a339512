//! 도메인 모델.
//!
//! - [`market_record`]: 스냅샷 1회분의 종목별 시장 레코드
//! - [`treemap`]: 트리맵 계층 구조 (시장 → 섹터 → 종목)
//! - [`rank`]: 랭킹 항목 및 정렬 기준/방향
//! - [`view`]: 캐시에 게시되는 뷰의 tagged union
//! - [`chart`]: 시세 이력/종목 검색 DTO

pub mod chart;
pub mod market_record;
pub mod rank;
pub mod treemap;
pub mod view;

pub use chart::{ChartData, PriceHistoryPoint, StockSearchItem};
pub use market_record::MarketRecord;
pub use rank::{RankMetric, RankOrder, RankedEntry};
pub use treemap::{TreemapNode, TreemapSector, TreemapView};
pub use view::CachedView;
