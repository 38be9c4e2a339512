//! 랭킹 항목 및 정렬 기준.
//!
//! 랭킹 테이블의 개별 항목(`RankedEntry`)과 정렬 기준/방향 enum을
//! 정의합니다. 순위는 정렬·절단 후 순서대로 1부터 부여되는 위치 기반
//! dense rank이며, 동점이어도 공유되지 않습니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 랭킹 테이블의 개별 항목.
///
/// 수치 필드의 null은 캐시 게시 전에 이미 0으로 보정되어 있습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RankedEntry {
    /// 순위 (1부터 시작, 위치 기반)
    pub rank: u32,
    /// 종목 코드
    pub symbol: String,
    /// 종목명
    pub name: String,
    /// 현재가
    pub current_price: i64,
    /// 등락률 (%)
    pub change_rate: Decimal,
    /// 거래량
    pub volume: i64,
    /// 거래대금
    pub trade_value: i64,
    /// 시가총액
    pub market_cap: i64,
}

/// 랭킹 정렬 기준.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RankMetric {
    /// 시가총액
    MarketCap,
    /// 거래량
    Volume,
    /// 거래대금
    TradeValue,
    /// 등락률
    ChangeRate,
}

impl RankMetric {
    /// 문자열에서 파싱합니다 (대소문자 무시).
    ///
    /// 알 수 없는 값은 에러가 아니라 시가총액으로 간주합니다.
    pub fn parse_lenient(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "MARKET_CAP" => Self::MarketCap,
            "VOLUME" => Self::Volume,
            "TRADE_VALUE" => Self::TradeValue,
            "CHANGE_RATE" => Self::ChangeRate,
            _ => Self::MarketCap,
        }
    }

    /// 캐시 키에 사용되는 대문자 표기를 반환합니다.
    pub fn as_key(&self) -> &'static str {
        match self {
            Self::MarketCap => "MARKET_CAP",
            Self::Volume => "VOLUME",
            Self::TradeValue => "TRADE_VALUE",
            Self::ChangeRate => "CHANGE_RATE",
        }
    }
}

/// 랭킹 정렬 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RankOrder {
    /// 오름차순
    Asc,
    /// 내림차순
    Desc,
}

impl RankOrder {
    /// 문자열에서 파싱합니다 (대소문자 무시). 알 수 없는 값은 내림차순.
    pub fn parse_lenient(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    /// 캐시 키에 사용되는 대문자 표기를 반환합니다.
    pub fn as_key(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_parse_lenient() {
        assert_eq!(RankMetric::parse_lenient("volume"), RankMetric::Volume);
        assert_eq!(
            RankMetric::parse_lenient("CHANGE_RATE"),
            RankMetric::ChangeRate
        );
        // 알 수 없는 기준은 시가총액으로 폴백
        assert_eq!(RankMetric::parse_lenient("PER"), RankMetric::MarketCap);
        assert_eq!(RankMetric::parse_lenient(""), RankMetric::MarketCap);
    }

    #[test]
    fn test_order_parse_lenient() {
        assert_eq!(RankOrder::parse_lenient("asc"), RankOrder::Asc);
        assert_eq!(RankOrder::parse_lenient("ASC"), RankOrder::Asc);
        assert_eq!(RankOrder::parse_lenient("desc"), RankOrder::Desc);
        assert_eq!(RankOrder::parse_lenient("whatever"), RankOrder::Desc);
    }

    #[test]
    fn test_key_forms() {
        assert_eq!(RankMetric::TradeValue.as_key(), "TRADE_VALUE");
        assert_eq!(RankOrder::Asc.as_key(), "ASC");
    }
}
