//! 대시보드 조회 서비스.
//!
//! API 핸들러가 쓰는 읽기 전용 파사드입니다. 모든 조회는 캐시에서만
//! 답하고, 없는 키는 에러 대신 None/빈 리스트로 답합니다.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use dash_core::{CachedView, RankMetric, RankOrder, RankedEntry};

use crate::cache::MarketViewCache;
use crate::keys;

/// 캐시 기반 대시보드 조회 파사드.
#[derive(Clone)]
pub struct DashboardService {
    cache: Arc<MarketViewCache>,
}

impl DashboardService {
    /// 새 서비스를 생성합니다.
    pub fn new(cache: Arc<MarketViewCache>) -> Self {
        Self { cache }
    }

    /// 공유 캐시 참조를 반환합니다.
    pub fn cache(&self) -> &Arc<MarketViewCache> {
        &self.cache
    }

    /// 시장 트리맵을 조회합니다.
    pub async fn get_treemap(&self, market: &str) -> Option<Arc<CachedView>> {
        let key = keys::treemap(market);
        debug!(key = %key, "트리맵 조회");
        self.cache.get(&key).await
    }

    /// 랭킹을 조회하고 `limit`까지 자릅니다.
    ///
    /// 키가 없거나 랭킹 뷰가 아니면 빈 리스트입니다.
    pub async fn get_ranking(
        &self,
        by: RankMetric,
        market: &str,
        order: RankOrder,
        limit: usize,
    ) -> Vec<RankedEntry> {
        let key = keys::rank(market, by, order);
        debug!(key = %key, limit = limit, "랭킹 조회");

        match self.cache.get(&key).await {
            Some(view) => view
                .as_ranking()
                .map(|entries| entries.iter().take(limit).cloned().collect())
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// 등락률 상위/하위 결합 리스트를 조회합니다.
    ///
    /// 캐시에는 내림차순(limit)++오름차순(limit) 결합이 들어 있고, 여기서
    /// 부호 기준으로 상승 상위 `limit/2`개와 하락 하위 `limit/2`개를
    /// 골라 냅니다. 하락 쪽은 낙폭이 작은 순(내림차순)으로 뒤집습니다.
    pub async fn get_top_and_bottom(&self, market: &str, limit: usize) -> Vec<RankedEntry> {
        let key = keys::top_and_bottom(market);
        debug!(key = %key, limit = limit, "Top & Bottom 랭킹 조회");

        let Some(view) = self.cache.get(&key).await else {
            return Vec::new();
        };
        let Some(entries) = view.as_ranking() else {
            return Vec::new();
        };

        let half = limit / 2;

        let top: Vec<RankedEntry> = entries
            .iter()
            .filter(|e| e.change_rate.is_sign_positive() || e.change_rate.is_zero())
            .take(half)
            .cloned()
            .collect();

        let mut bottom: Vec<RankedEntry> = entries
            .iter()
            .filter(|e| e.change_rate.is_sign_negative() && !e.change_rate.is_zero())
            .cloned()
            .collect();
        bottom.sort_by(|a, b| a.change_rate.cmp(&b.change_rate));
        bottom.truncate(half);
        bottom.sort_by(|a, b| b.change_rate.cmp(&a.change_rate));

        let mut combined = top;
        combined.extend(bottom);
        combined
    }

    /// 요청받은 키들의 뷰를 한 번에 조회합니다. 없는 키는 응답에서
    /// 빠집니다.
    pub async fn get_dynamic_bundle(
        &self,
        requested_keys: &[String],
    ) -> HashMap<String, Arc<CachedView>> {
        debug!(requested = requested_keys.len(), "dynamic-data 번들 조회");
        self.cache.get_many(requested_keys).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use dash_core::TreemapView;

    fn entry(symbol: &str, rank: u32, rate: Decimal) -> RankedEntry {
        RankedEntry {
            rank,
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            current_price: 1_000,
            change_rate: rate,
            volume: 0,
            trade_value: 0,
            market_cap: 0,
        }
    }

    async fn service_with(views: Vec<(String, CachedView)>) -> DashboardService {
        let cache = Arc::new(MarketViewCache::new());
        cache.publish(views).await;
        DashboardService::new(cache)
    }

    #[tokio::test]
    async fn test_treemap_absent_is_none() {
        let service = service_with(vec![]).await;
        assert!(service.get_treemap("KONEX").await.is_none());
    }

    #[tokio::test]
    async fn test_ranking_truncates_to_limit() {
        let entries: Vec<RankedEntry> = (1..=100)
            .map(|i| entry(&format!("S{i}"), i, dec!(0)))
            .collect();
        let service = service_with(vec![(
            "rank_ALL_VOLUME_DESC".to_string(),
            CachedView::Ranking(entries),
        )])
        .await;

        let result = service
            .get_ranking(RankMetric::Volume, "all", RankOrder::Desc, 20)
            .await;
        assert_eq!(result.len(), 20);
        assert_eq!(result[0].symbol, "S1");
    }

    #[tokio::test]
    async fn test_ranking_absent_key_is_empty() {
        let service = service_with(vec![]).await;
        let result = service
            .get_ranking(RankMetric::MarketCap, "KOSPI", RankOrder::Desc, 20)
            .await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_ranking_wrong_variant_is_empty() {
        let service = service_with(vec![(
            "rank_ALL_MARKET_CAP_DESC".to_string(),
            CachedView::Treemap(TreemapView::empty("ALL")),
        )])
        .await;
        let result = service
            .get_ranking(RankMetric::MarketCap, "ALL", RankOrder::Desc, 20)
            .await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_top_and_bottom_sign_split() {
        // 캐시 형태: 내림차순 결합 리스트 (상승 2, 0 포함, 하락 3)
        let combined = vec![
            entry("U1", 1, dec!(5.0)),
            entry("U2", 2, dec!(2.0)),
            entry("Z", 3, dec!(0)),
            entry("D1", 4, dec!(-1.0)),
            entry("D2", 5, dec!(-3.0)),
            entry("D3", 6, dec!(-6.0)),
        ];
        let service = service_with(vec![(
            "rank_ALL_CHANGE_RATE_TOP_AND_BOTTOM".to_string(),
            CachedView::Ranking(combined),
        )])
        .await;

        let result = service.get_top_and_bottom("ALL", 4).await;
        assert_eq!(result.len(), 4);
        // 상위: 등락률 >= 0에서 앞 2개
        assert_eq!(result[0].symbol, "U1");
        assert_eq!(result[1].symbol, "U2");
        // 하위: 최저 2개를 내림차순으로
        assert_eq!(result[2].symbol, "D2");
        assert_eq!(result[3].symbol, "D3");
    }

    #[tokio::test]
    async fn test_top_and_bottom_absent_is_empty() {
        let service = service_with(vec![]).await;
        assert!(service.get_top_and_bottom("ALL", 20).await.is_empty());
    }

    #[tokio::test]
    async fn test_dynamic_bundle_drops_absent_keys() {
        let service = service_with(vec![(
            "treemap_KOSPI".to_string(),
            CachedView::Treemap(TreemapView::empty("KOSPI")),
        )])
        .await;

        let bundle = service
            .get_dynamic_bundle(&[
                "treemap_KOSPI".to_string(),
                "index_KOSPI".to_string(),
            ])
            .await;
        assert_eq!(bundle.len(), 1);
        assert!(bundle.contains_key("treemap_KOSPI"));
    }
}
