//! 데이터 소스 trait.
//!
//! 캐시 갱신 파이프라인과 API 핸들러가 의존하는 경계입니다.
//! 운영에서는 PostgreSQL 구현([`crate::KrxMarketStore`])을 쓰고,
//! 테스트에서는 실패를 주입할 수 있는 mock을 씁니다.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use dash_core::{MarketRecord, PriceHistoryPoint, StockSearchItem};

use crate::Result;

/// 시장 스냅샷 데이터 소스.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// 가장 최근 기준일의 장중 시장 데이터를 시가총액 순으로 조회합니다.
    async fn fetch_live_snapshot(&self) -> Result<Vec<MarketRecord>>;

    /// 특정 날짜의 장 마감 후 시장 데이터를 조회합니다.
    ///
    /// 해당 날짜에 수집된 여러 건 중 가장 마지막 수집분을 기준으로 합니다.
    async fn fetch_snapshot_as_of(&self, date: NaiveDate) -> Result<Vec<MarketRecord>>;

    /// 종목 코드로 종목명을 조회합니다.
    async fn fetch_stock_name(&self, symbol: &str) -> Result<Option<String>>;

    /// 종목명 또는 종목 코드로 검색합니다.
    async fn search_by_name(&self, query: &str, limit: i64) -> Result<Vec<StockSearchItem>>;

    /// 특정 종목의 일별 시세 이력을 조회합니다 (오래된 날짜부터).
    async fn fetch_price_history(
        &self,
        symbol: &str,
        from: NaiveDate,
    ) -> Result<Vec<PriceHistoryPoint>>;

    /// 주어진 종목 코드들의 최신 시세를 조회합니다.
    async fn fetch_latest_quotes(&self, symbols: &[String]) -> Result<Vec<MarketRecord>>;
}

/// 외부 시장 지수 피드.
///
/// 갱신 사이클에서 보조적으로 쓰이며, 실패는 호출자가 삼킵니다
/// (해당 캐시 엔트리만 생략).
#[async_trait]
pub trait IndexFeed: Send + Sync {
    /// 지수 분류 코드("02" = KOSPI, "03" = KOSDAQ)로 지수 레코드를
    /// 조회합니다. 피드가 주는 원본 키-값 형태 그대로 반환합니다.
    async fn fetch_index(&self, midclss_cd: &str) -> Result<HashMap<String, String>>;
}
