//! 시세 이력 및 종목 검색 DTO.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lightweight Charts용 일별 시세 이력 한 건.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceHistoryPoint {
    /// 날짜 (yyyy-MM-dd)
    pub time: String,
    /// 시가
    pub open: i64,
    /// 고가
    pub high: i64,
    /// 저가
    pub low: i64,
    /// 종가
    pub close: i64,
    /// 거래량
    pub volume: i64,
}

/// 종목명과 시세 이력을 함께 담는 차트 응답.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChartData {
    /// 종목명
    pub stock_name: String,
    /// 시세 이력 (오래된 날짜부터)
    pub history: Vec<PriceHistoryPoint>,
}

/// 종목 검색 결과 한 건.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockSearchItem {
    /// 종목 코드
    pub symbol: String,
    /// 종목명
    pub name: String,
}
