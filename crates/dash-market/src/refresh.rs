//! 캐시 갱신 스케줄러.
//!
//! 주기적으로 시장 스냅샷을 읽어 모든 뷰를 다시 만들고 캐시에
//! 게시합니다. 스냅샷 조회가 실패하면 해당 사이클은 게시 없이 끝나고
//! 이전 세대가 계속 서빙됩니다. 지수 피드는 보조 데이터라서 시장별로
//! 독립적으로 실패를 건너뜁니다.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use dash_core::{CachedView, DashboardError, DashboardResult, MarketRecord, RankMetric, RankOrder};
use dash_data::{IndexFeed, MarketDataSource};

use crate::cache::MarketViewCache;
use crate::keys;
use crate::transform::{build_ranking, build_top_and_bottom, build_treemap};

/// 지수 피드에서 가져오는 시장과 분류 코드.
const INDEX_MARKETS: [(&str, &str); 2] = [("KOSPI", "02"), ("KOSDAQ", "03")];

/// 갱신 스케줄러 설정.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// 갱신 주기 (기본: 5분)
    pub interval: Duration,
    /// 랭킹 뷰에 미리 계산해 두는 깊이 (기본: 100)
    pub rank_depth: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            rank_depth: 100,
        }
    }
}

impl RefreshConfig {
    /// 환경변수에서 설정 로드.
    ///
    /// # 환경변수
    /// * `CACHE_REFRESH_INTERVAL_SECS` - 갱신 주기 (초, 기본: 300)
    /// * `CACHE_RANK_DEPTH` - 랭킹 사전 계산 깊이 (기본: 100)
    pub fn from_env() -> Self {
        let interval_secs: u64 = std::env::var("CACHE_REFRESH_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        let rank_depth: usize = std::env::var("CACHE_RANK_DEPTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);

        Self {
            interval: Duration::from_secs(interval_secs),
            rank_depth,
        }
    }
}

/// 갱신 사이클 한 번을 실행하고 게시한 뷰 수를 반환합니다.
///
/// 스냅샷을 한 번만 읽고 모든 뷰를 그 위에서 만듭니다. ALL 랭킹은
/// ETF를 포함한 전체 스냅샷을, 트리맵과 시장별 랭킹은 주식만 씁니다.
pub async fn run_refresh_cycle(
    source: &dyn MarketDataSource,
    index_feed: &dyn IndexFeed,
    cache: &MarketViewCache,
    config: &RefreshConfig,
) -> DashboardResult<usize> {
    let snapshot = source
        .fetch_live_snapshot()
        .await
        .map_err(|e| DashboardError::DataSource(e.to_string()))?;

    let (equities, etfs): (Vec<MarketRecord>, Vec<MarketRecord>) =
        snapshot.iter().cloned().partition(|r| !r.is_etf());

    let depth = config.rank_depth;
    let mut views: Vec<(String, CachedView)> = vec![
        (
            keys::treemap("KOSPI"),
            CachedView::Treemap(build_treemap(&equities, "KOSPI")),
        ),
        (
            keys::treemap("KOSDAQ"),
            CachedView::Treemap(build_treemap(&equities, "KOSDAQ")),
        ),
        (
            keys::treemap("ALL"),
            CachedView::Treemap(build_treemap(&equities, "ALL")),
        ),
        (
            keys::treemap("ETF"),
            CachedView::Treemap(build_treemap(&etfs, "ETF")),
        ),
        (
            keys::rank("KOSPI", RankMetric::MarketCap, RankOrder::Desc),
            CachedView::Ranking(build_ranking(
                &equities,
                "KOSPI",
                RankMetric::MarketCap,
                RankOrder::Desc,
                depth,
            )),
        ),
        (
            keys::rank("KOSDAQ", RankMetric::MarketCap, RankOrder::Desc),
            CachedView::Ranking(build_ranking(
                &equities,
                "KOSDAQ",
                RankMetric::MarketCap,
                RankOrder::Desc,
                depth,
            )),
        ),
        (
            keys::rank("ALL", RankMetric::ChangeRate, RankOrder::Desc),
            CachedView::Ranking(build_ranking(
                &snapshot,
                "ALL",
                RankMetric::ChangeRate,
                RankOrder::Desc,
                depth,
            )),
        ),
        (
            keys::rank("ALL", RankMetric::ChangeRate, RankOrder::Asc),
            CachedView::Ranking(build_ranking(
                &snapshot,
                "ALL",
                RankMetric::ChangeRate,
                RankOrder::Asc,
                depth,
            )),
        ),
        (
            keys::rank("ALL", RankMetric::Volume, RankOrder::Desc),
            CachedView::Ranking(build_ranking(
                &snapshot,
                "ALL",
                RankMetric::Volume,
                RankOrder::Desc,
                depth,
            )),
        ),
        (
            keys::rank("ALL", RankMetric::TradeValue, RankOrder::Desc),
            CachedView::Ranking(build_ranking(
                &snapshot,
                "ALL",
                RankMetric::TradeValue,
                RankOrder::Desc,
                depth,
            )),
        ),
        (
            keys::top_and_bottom("ALL"),
            CachedView::Ranking(build_top_and_bottom(&snapshot, "ALL", depth)),
        ),
    ];

    // 지수는 보조 데이터. 실패한 시장만 건너뛰고 이전 캐시 값이 유지됨
    for (market, midclss_cd) in INDEX_MARKETS {
        match index_feed.fetch_index(midclss_cd).await {
            Ok(record) => views.push((keys::index(market), CachedView::Index(record))),
            Err(e) => {
                warn!(market = market, error = %e, "지수 조회 실패, 해당 키 생략");
            }
        }
    }

    let published = views.len();
    cache.publish(views).await;

    info!(
        records = snapshot.len(),
        equities = equities.len(),
        etfs = etfs.len(),
        published = published,
        "시장 데이터 캐시 갱신 완료"
    );
    Ok(published)
}

/// 백그라운드 갱신 태스크 시작.
///
/// 첫 사이클은 호출자가 서버 기동 전에 직접 실행하므로, 태스크는
/// interval의 즉시 발화하는 첫 tick을 소비하고 다음 주기부터 돕니다.
pub fn start_refresher(
    source: Arc<dyn MarketDataSource>,
    index_feed: Arc<dyn IndexFeed>,
    cache: Arc<MarketViewCache>,
    config: RefreshConfig,
    shutdown_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_secs = config.interval.as_secs(),
            rank_depth = config.rank_depth,
            "캐시 갱신 태스크 시작"
        );

        let mut ticker = interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await; // 첫 tick 건너뛰기 (초기 적재는 기동 시 완료됨)

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = run_refresh_cycle(
                        source.as_ref(),
                        index_feed.as_ref(),
                        cache.as_ref(),
                        &config,
                    )
                    .await
                    {
                        error!(error = %e, "시장 데이터 캐시 갱신 실패, 이전 세대 유지");
                    }
                }
                _ = shutdown_token.cancelled() => {
                    info!("캐시 갱신 태스크: 종료 시그널 수신");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use std::collections::HashMap;

    use dash_core::{PriceHistoryPoint, StockSearchItem};
    use dash_data::DataError;

    struct StaticSource {
        records: Vec<MarketRecord>,
    }

    #[async_trait]
    impl MarketDataSource for StaticSource {
        async fn fetch_live_snapshot(&self) -> dash_data::Result<Vec<MarketRecord>> {
            Ok(self.records.clone())
        }

        async fn fetch_snapshot_as_of(
            &self,
            _date: NaiveDate,
        ) -> dash_data::Result<Vec<MarketRecord>> {
            Ok(Vec::new())
        }

        async fn fetch_stock_name(&self, _symbol: &str) -> dash_data::Result<Option<String>> {
            Ok(None)
        }

        async fn search_by_name(
            &self,
            _query: &str,
            _limit: i64,
        ) -> dash_data::Result<Vec<StockSearchItem>> {
            Ok(Vec::new())
        }

        async fn fetch_price_history(
            &self,
            _symbol: &str,
            _from: NaiveDate,
        ) -> dash_data::Result<Vec<PriceHistoryPoint>> {
            Ok(Vec::new())
        }

        async fn fetch_latest_quotes(
            &self,
            _symbols: &[String],
        ) -> dash_data::Result<Vec<MarketRecord>> {
            Ok(Vec::new())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl MarketDataSource for FailingSource {
        async fn fetch_live_snapshot(&self) -> dash_data::Result<Vec<MarketRecord>> {
            Err(DataError::QueryError("connection refused".to_string()))
        }

        async fn fetch_snapshot_as_of(
            &self,
            _date: NaiveDate,
        ) -> dash_data::Result<Vec<MarketRecord>> {
            Err(DataError::QueryError("connection refused".to_string()))
        }

        async fn fetch_stock_name(&self, _symbol: &str) -> dash_data::Result<Option<String>> {
            Err(DataError::QueryError("connection refused".to_string()))
        }

        async fn search_by_name(
            &self,
            _query: &str,
            _limit: i64,
        ) -> dash_data::Result<Vec<StockSearchItem>> {
            Err(DataError::QueryError("connection refused".to_string()))
        }

        async fn fetch_price_history(
            &self,
            _symbol: &str,
            _from: NaiveDate,
        ) -> dash_data::Result<Vec<PriceHistoryPoint>> {
            Err(DataError::QueryError("connection refused".to_string()))
        }

        async fn fetch_latest_quotes(
            &self,
            _symbols: &[String],
        ) -> dash_data::Result<Vec<MarketRecord>> {
            Err(DataError::QueryError("connection refused".to_string()))
        }
    }

    struct StaticFeed;

    #[async_trait]
    impl IndexFeed for StaticFeed {
        async fn fetch_index(
            &self,
            midclss_cd: &str,
        ) -> dash_data::Result<HashMap<String, String>> {
            Ok(HashMap::from([(
                "IDX_NM".to_string(),
                format!("지수-{midclss_cd}"),
            )]))
        }
    }

    struct FailingFeed;

    #[async_trait]
    impl IndexFeed for FailingFeed {
        async fn fetch_index(
            &self,
            _midclss_cd: &str,
        ) -> dash_data::Result<HashMap<String, String>> {
            Err(DataError::FetchError("krx unreachable".to_string()))
        }
    }

    fn record(symbol: &str, market: Option<&str>) -> MarketRecord {
        MarketRecord {
            symbol: symbol.to_string(),
            name: Some(symbol.to_string()),
            sector_name: Some("전기전자".to_string()),
            market_type: market.map(String::from),
            market_cap: Some(100),
            change_rate: None,
            current_price: Some(1_000),
            open_price: None,
            high_price: None,
            low_price: None,
            trade_volume: Some(10),
            trade_value: Some(10_000),
            metric_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            collected_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_cycle_publishes_full_view_set() {
        let source = StaticSource {
            records: vec![
                record("A", Some("KOSPI")),
                record("B", Some("KOSDAQ")),
                record("C", None),
            ],
        };
        let cache = MarketViewCache::new();
        let config = RefreshConfig::default();

        let published = run_refresh_cycle(&source, &StaticFeed, &cache, &config)
            .await
            .unwrap();
        // 트리맵 4 + 랭킹 7 + 지수 2
        assert_eq!(published, 13);

        for key in [
            "treemap_KOSPI",
            "treemap_KOSDAQ",
            "treemap_ALL",
            "treemap_ETF",
            "rank_KOSPI_MARKET_CAP_DESC",
            "rank_KOSDAQ_MARKET_CAP_DESC",
            "rank_ALL_CHANGE_RATE_DESC",
            "rank_ALL_CHANGE_RATE_ASC",
            "rank_ALL_VOLUME_DESC",
            "rank_ALL_TRADE_VALUE_DESC",
            "rank_ALL_CHANGE_RATE_TOP_AND_BOTTOM",
            "index_KOSPI",
            "index_KOSDAQ",
        ] {
            assert!(cache.get(key).await.is_some(), "missing key: {key}");
        }
    }

    #[tokio::test]
    async fn test_all_rankings_include_etfs_but_treemaps_do_not() {
        let source = StaticSource {
            records: vec![record("A", Some("KOSPI")), record("E", None)],
        };
        let cache = MarketViewCache::new();
        run_refresh_cycle(&source, &StaticFeed, &cache, &RefreshConfig::default())
            .await
            .unwrap();

        let all_treemap = cache.get("treemap_ALL").await.unwrap();
        assert_eq!(all_treemap.as_treemap().unwrap().leaf_count(), 1);

        let all_volume = cache.get("rank_ALL_VOLUME_DESC").await.unwrap();
        assert_eq!(all_volume.as_ranking().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_snapshot_keeps_previous_generation() {
        let cache = MarketViewCache::new();
        let config = RefreshConfig::default();

        let good = StaticSource {
            records: vec![record("A", Some("KOSPI"))],
        };
        run_refresh_cycle(&good, &StaticFeed, &cache, &config)
            .await
            .unwrap();
        let before = cache.len().await;

        let err = run_refresh_cycle(&FailingSource, &StaticFeed, &cache, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::DataSource(_)));

        // 실패한 사이클은 아무 것도 게시하지 않음
        assert_eq!(cache.len().await, before);
        assert!(cache.get("treemap_KOSPI").await.is_some());
    }

    #[tokio::test]
    async fn test_index_feed_failure_skips_only_index_keys() {
        let source = StaticSource {
            records: vec![record("A", Some("KOSPI"))],
        };
        let cache = MarketViewCache::new();
        let published = run_refresh_cycle(&source, &FailingFeed, &cache, &RefreshConfig::default())
            .await
            .unwrap();

        assert_eq!(published, 11);
        assert!(cache.get("index_KOSPI").await.is_none());
        assert!(cache.get("treemap_KOSPI").await.is_some());
    }

    #[test]
    fn test_config_defaults() {
        // from_env는 변수가 없으면 Default와 같은 값으로 떨어진다
        let config = RefreshConfig::default();
        assert_eq!(config.interval, Duration::from_secs(300));
        assert_eq!(config.rank_depth, 100);
    }
}
