//! 스냅샷 시장 레코드.
//!
//! 한 번의 스냅샷 조회에서 종목 하나에 해당하는 플랫 레코드입니다.
//! 대부분의 수치 필드는 수집 누락을 허용하기 위해 Option입니다.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 단일 종목의 시장 스냅샷 레코드.
///
/// `market_type`이 None이면 비상장주식(ETF 등 비주식 상품)을 의미합니다.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarketRecord {
    /// 종목 코드 (예: "005930")
    pub symbol: String,
    /// 종목명 (예: "삼성전자")
    pub name: Option<String>,
    /// 섹터(업종)명
    pub sector_name: Option<String>,
    /// 시장 구분 (KOSPI, KOSDAQ) - None이면 ETF
    pub market_type: Option<String>,
    /// 시가총액
    pub market_cap: Option<i64>,
    /// 등락률 (%)
    pub change_rate: Option<Decimal>,
    /// 현재가 (종가)
    pub current_price: Option<i64>,
    /// 시가
    pub open_price: Option<i64>,
    /// 고가
    pub high_price: Option<i64>,
    /// 저가
    pub low_price: Option<i64>,
    /// 누적 거래량
    pub trade_volume: Option<i64>,
    /// 누적 거래대금
    pub trade_value: Option<i64>,
    /// 데이터 기준일
    pub metric_date: NaiveDate,
    /// 데이터 수집 시각
    pub collected_at: DateTime<Utc>,
}

impl MarketRecord {
    /// 시장 구분이 없는 레코드(ETF 등)인지 확인합니다.
    pub fn is_etf(&self) -> bool {
        self.market_type.is_none()
    }

    /// 시장 필터와 일치하는지 확인합니다 (대소문자 무시).
    ///
    /// "ALL"은 항상 일치합니다. 그 외의 필터는 `market_type`과
    /// 대소문자 무시 비교합니다 (None이면 불일치).
    pub fn matches_market(&self, market_filter: &str) -> bool {
        if market_filter.eq_ignore_ascii_case("ALL") {
            return true;
        }
        self.market_type
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case(market_filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(market_type: Option<&str>) -> MarketRecord {
        MarketRecord {
            symbol: "005930".to_string(),
            name: Some("삼성전자".to_string()),
            sector_name: Some("전기전자".to_string()),
            market_type: market_type.map(String::from),
            market_cap: Some(400_000_000_000_000),
            change_rate: Some(dec!(1.25)),
            current_price: Some(70_000),
            open_price: Some(69_500),
            high_price: Some(70_500),
            low_price: Some(69_000),
            trade_volume: Some(12_000_000),
            trade_value: Some(840_000_000_000),
            metric_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            collected_at: Utc::now(),
        }
    }

    #[test]
    fn test_matches_market_case_insensitive() {
        let r = record(Some("KOSPI"));
        assert!(r.matches_market("kospi"));
        assert!(r.matches_market("KOSPI"));
        assert!(!r.matches_market("KOSDAQ"));
    }

    #[test]
    fn test_all_matches_everything() {
        assert!(record(Some("KOSPI")).matches_market("ALL"));
        assert!(record(None).matches_market("all"));
    }

    #[test]
    fn test_etf_detection() {
        assert!(record(None).is_etf());
        assert!(!record(Some("KOSDAQ")).is_etf());
        // ETF는 명시적 시장 필터와는 일치하지 않음
        assert!(!record(None).matches_market("KOSPI"));
    }
}
