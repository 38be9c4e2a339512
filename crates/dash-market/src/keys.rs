//! 캐시 키 규칙.
//!
//! 키는 항상 대문자 시장/기준/방향 조합으로 만들어집니다. 프론트엔드의
//! dynamic-data 요청이 이 키 문자열을 그대로 보내므로 포맷은 계약입니다.

use dash_core::{RankMetric, RankOrder};

/// 트리맵 뷰 키 (`treemap_KOSPI` 형태).
pub fn treemap(market: &str) -> String {
    format!("treemap_{}", market.to_uppercase())
}

/// 랭킹 뷰 키 (`rank_ALL_VOLUME_DESC` 형태).
pub fn rank(market: &str, metric: RankMetric, order: RankOrder) -> String {
    format!(
        "rank_{}_{}_{}",
        market.to_uppercase(),
        metric.as_key(),
        order.as_key()
    )
}

/// 등락률 Top & Bottom 결합 뷰 키.
pub fn top_and_bottom(market: &str) -> String {
    format!("rank_{}_CHANGE_RATE_TOP_AND_BOTTOM", market.to_uppercase())
}

/// 시장 지수 키 (`index_KOSPI` 형태).
pub fn index(market: &str) -> String {
    format!("index_{}", market.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_formats() {
        assert_eq!(treemap("kospi"), "treemap_KOSPI");
        assert_eq!(
            rank("all", RankMetric::Volume, RankOrder::Desc),
            "rank_ALL_VOLUME_DESC"
        );
        assert_eq!(
            top_and_bottom("All"),
            "rank_ALL_CHANGE_RATE_TOP_AND_BOTTOM"
        );
        assert_eq!(index("KOSDAQ"), "index_KOSDAQ");
    }
}
