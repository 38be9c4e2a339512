//! 스냅샷 변환기.
//!
//! 플랫한 시장 스냅샷을 트리맵/랭킹 뷰로 변환합니다. 순수 함수라서
//! 갱신 사이클이 어떤 스냅샷을 주든 같은 입력이면 같은 뷰가 나옵니다.
//!
//! null 처리 규칙:
//! - 시가총액/거래량/거래대금 정렬은 요청 방향과 무관하게 항상
//!   내림차순, null은 맨 뒤.
//! - 등락률 오름차순은 null이 맨 앞, 내림차순은 null이 맨 뒤.
//! - 뷰로 내보낼 때는 null 수치를 0으로 보정.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rust_decimal::Decimal;

use dash_core::{
    MarketRecord, RankMetric, RankOrder, RankedEntry, TreemapNode, TreemapSector, TreemapView,
};

/// 섹터 정보가 없는 종목이 모이는 섹터명.
pub const UNKNOWN_SECTOR: &str = "기타 섹터";
/// 종목명이 없는 레코드의 표시명.
pub const UNKNOWN_NAME: &str = "이름없음";
/// ALL 트리맵의 루트 이름.
pub const ALL_MARKET_NAME: &str = "통합 시장";

/// 스냅샷을 섹터별 트리맵 계층으로 변환합니다.
///
/// "ALL"과 "ETF"는 전달받은 레코드를 전부 쓰고, 그 외 필터는
/// `market_type` 일치 레코드만 씁니다. 빈 결과는 필터명을 그대로
/// 루트로 한 빈 트리맵입니다 (빈 입력에서는 ALL도 "통합 시장"으로
/// 매핑하지 않음).
pub fn build_treemap(records: &[MarketRecord], market_filter: &str) -> TreemapView {
    let pass_through = market_filter.eq_ignore_ascii_case("ALL")
        || market_filter.eq_ignore_ascii_case("ETF");

    let selected: Vec<&MarketRecord> = records
        .iter()
        .filter(|r| pass_through || r.matches_market(market_filter))
        .collect();

    if selected.is_empty() {
        return TreemapView::empty(market_filter);
    }

    // BTreeMap으로 섹터 순서를 결정적으로 유지
    let mut by_sector: BTreeMap<String, Vec<TreemapNode>> = BTreeMap::new();
    for record in selected {
        let sector = record
            .sector_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_SECTOR.to_string());
        by_sector.entry(sector).or_default().push(TreemapNode {
            symbol: record.symbol.clone(),
            name: record
                .name
                .clone()
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            value: record.market_cap.unwrap_or(0),
            fluc_rate: record.change_rate.unwrap_or_default(),
            cur_price: record.current_price.unwrap_or(0),
        });
    }

    let children = by_sector
        .into_iter()
        .map(|(name, children)| TreemapSector { name, children })
        .collect();

    let root_name = if market_filter.eq_ignore_ascii_case("ALL") {
        ALL_MARKET_NAME.to_string()
    } else if market_filter.eq_ignore_ascii_case("ETF") {
        "ETF".to_string()
    } else {
        market_filter.to_string()
    };

    TreemapView {
        name: root_name,
        children,
    }
}

/// 스냅샷을 정렬·절단해 랭킹 리스트로 변환합니다.
///
/// 순위는 절단 후 순서대로 1부터 부여됩니다.
pub fn build_ranking(
    records: &[MarketRecord],
    market_filter: &str,
    metric: RankMetric,
    order: RankOrder,
    limit: usize,
) -> Vec<RankedEntry> {
    let mut selected: Vec<&MarketRecord> = records
        .iter()
        .filter(|r| r.matches_market(market_filter))
        .collect();

    selected.sort_by(|a, b| compare(a, b, metric, order));

    selected
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, r)| RankedEntry {
            rank: (i + 1) as u32,
            symbol: r.symbol.clone(),
            name: r.name.clone().unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            current_price: r.current_price.unwrap_or(0),
            change_rate: r.change_rate.unwrap_or_default(),
            volume: r.trade_volume.unwrap_or(0),
            trade_value: r.trade_value.unwrap_or(0),
            market_cap: r.market_cap.unwrap_or(0),
        })
        .collect()
}

/// 등락률 상위/하위 결합 리스트를 만듭니다.
///
/// CHANGE_RATE 내림차순 `limit`개 뒤에 오름차순 `limit`개를 이어
/// 붙입니다. 중복 제거는 하지 않고 각 절반이 1부터 다시 순위를 가집니다.
pub fn build_top_and_bottom(
    records: &[MarketRecord],
    market_filter: &str,
    limit: usize,
) -> Vec<RankedEntry> {
    let mut combined = build_ranking(
        records,
        market_filter,
        RankMetric::ChangeRate,
        RankOrder::Desc,
        limit,
    );
    combined.extend(build_ranking(
        records,
        market_filter,
        RankMetric::ChangeRate,
        RankOrder::Asc,
        limit,
    ));
    combined
}

fn compare(a: &MarketRecord, b: &MarketRecord, metric: RankMetric, order: RankOrder) -> Ordering {
    match metric {
        RankMetric::MarketCap => desc_nulls_last_i64(a.market_cap, b.market_cap),
        RankMetric::Volume => desc_nulls_last_i64(a.trade_volume, b.trade_volume),
        RankMetric::TradeValue => desc_nulls_last_i64(a.trade_value, b.trade_value),
        RankMetric::ChangeRate => match order {
            RankOrder::Asc => asc_nulls_first(a.change_rate, b.change_rate),
            RankOrder::Desc => desc_nulls_last(a.change_rate, b.change_rate),
        },
    }
}

fn desc_nulls_last_i64(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn desc_nulls_last(a: Option<Decimal>, b: Option<Decimal>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn asc_nulls_first(a: Option<Decimal>, b: Option<Decimal>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn record(
        symbol: &str,
        market: Option<&str>,
        sector: Option<&str>,
        cap: Option<i64>,
        rate: Option<Decimal>,
        volume: Option<i64>,
    ) -> MarketRecord {
        MarketRecord {
            symbol: symbol.to_string(),
            name: Some(format!("종목{symbol}")),
            sector_name: sector.map(String::from),
            market_type: market.map(String::from),
            market_cap: cap,
            change_rate: rate,
            current_price: Some(10_000),
            open_price: None,
            high_price: None,
            low_price: None,
            trade_volume: volume,
            trade_value: volume.map(|v| v * 10_000),
            metric_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            collected_at: Utc::now(),
        }
    }

    fn sample_snapshot() -> Vec<MarketRecord> {
        vec![
            record("A", Some("KOSPI"), Some("전기전자"), Some(500), Some(dec!(1.5)), Some(30)),
            record("B", Some("KOSPI"), Some("전기전자"), Some(300), Some(dec!(-0.7)), Some(90)),
            record("C", Some("KOSPI"), Some("화학"), Some(200), None, Some(10)),
            record("D", Some("KOSDAQ"), Some("제약"), Some(100), Some(dec!(4.2)), Some(70)),
            record("E", Some("KOSDAQ"), None, None, Some(dec!(-2.1)), None),
        ]
    }

    #[test]
    fn test_treemap_filters_by_market() {
        let snapshot = sample_snapshot();
        let kospi = build_treemap(&snapshot, "KOSPI");
        assert_eq!(kospi.name, "KOSPI");
        assert_eq!(kospi.leaf_count(), 3);

        let kosdaq = build_treemap(&snapshot, "kosdaq");
        assert_eq!(kosdaq.leaf_count(), 2);

        let all = build_treemap(&snapshot, "ALL");
        assert_eq!(all.name, ALL_MARKET_NAME);
        assert_eq!(all.leaf_count(), snapshot.len());
    }

    #[test]
    fn test_treemap_sector_and_name_sentinels() {
        let snapshot = vec![record("X", Some("KOSDAQ"), None, None, None, None)];
        let view = build_treemap(&snapshot, "KOSDAQ");
        assert_eq!(view.children.len(), 1);
        assert_eq!(view.children[0].name, UNKNOWN_SECTOR);

        let node = &view.children[0].children[0];
        assert_eq!(node.value, 0);
        assert_eq!(node.fluc_rate, Decimal::ZERO);
    }

    #[test]
    fn test_treemap_missing_name_sentinel() {
        let mut r = record("Y", Some("KOSPI"), Some("화학"), Some(10), None, None);
        r.name = None;
        let view = build_treemap(&[r], "KOSPI");
        assert_eq!(view.children[0].children[0].name, UNKNOWN_NAME);
    }

    #[test]
    fn test_treemap_empty_input_keeps_filter_as_root() {
        // 빈 입력은 ALL이어도 필터명이 그대로 루트명이 됨
        let view = build_treemap(&[], "ALL");
        assert_eq!(view.name, "ALL");
        assert!(view.children.is_empty());
    }

    #[test]
    fn test_treemap_etf_passes_all_records() {
        let snapshot = vec![
            record("E1", None, Some("국내 주식형"), Some(50), Some(dec!(0.3)), Some(5)),
            record("E2", None, None, Some(20), None, None),
        ];
        let view = build_treemap(&snapshot, "ETF");
        assert_eq!(view.name, "ETF");
        assert_eq!(view.leaf_count(), 2);
    }

    #[test]
    fn test_ranking_market_cap_ignores_requested_order() {
        let snapshot = sample_snapshot();
        // 시가총액은 ASC를 달라고 해도 항상 내림차순
        let asc = build_ranking(&snapshot, "ALL", RankMetric::MarketCap, RankOrder::Asc, 10);
        let desc = build_ranking(&snapshot, "ALL", RankMetric::MarketCap, RankOrder::Desc, 10);
        assert_eq!(asc, desc);
        assert_eq!(asc[0].symbol, "A");
        // null 시가총액은 맨 뒤
        assert_eq!(asc.last().unwrap().symbol, "E");
        assert_eq!(asc.last().unwrap().market_cap, 0);
    }

    #[test]
    fn test_ranking_change_rate_null_asymmetry() {
        let snapshot = sample_snapshot();

        let asc = build_ranking(&snapshot, "ALL", RankMetric::ChangeRate, RankOrder::Asc, 10);
        // 오름차순에서는 null 등락률(C)이 맨 앞
        assert_eq!(asc[0].symbol, "C");
        assert_eq!(asc[1].symbol, "E");

        let desc = build_ranking(&snapshot, "ALL", RankMetric::ChangeRate, RankOrder::Desc, 10);
        // 내림차순에서는 null이 맨 뒤
        assert_eq!(desc[0].symbol, "D");
        assert_eq!(desc.last().unwrap().symbol, "C");
    }

    #[test]
    fn test_ranking_dense_rank_after_truncate() {
        let snapshot = sample_snapshot();
        let top3 = build_ranking(&snapshot, "ALL", RankMetric::Volume, RankOrder::Desc, 3);
        assert_eq!(top3.len(), 3);
        let ranks: Vec<u32> = top3.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(top3[0].symbol, "B");
    }

    #[test]
    fn test_ranking_market_filter() {
        let snapshot = sample_snapshot();
        let kosdaq = build_ranking(&snapshot, "KOSDAQ", RankMetric::MarketCap, RankOrder::Desc, 10);
        assert_eq!(kosdaq.len(), 2);
        assert!(kosdaq.iter().all(|e| ["D", "E"].contains(&e.symbol.as_str())));
    }

    #[test]
    fn test_two_market_snapshot_sectors_and_cap_ranking() {
        // KOSPI 두 섹터 + KOSDAQ 한 섹터의 최소 스냅샷
        let snapshot = vec![
            record("K1", Some("KOSPI"), Some("S1"), Some(100), Some(dec!(1.0)), Some(1)),
            record("K2", Some("KOSPI"), Some("S2"), Some(200), Some(dec!(2.0)), Some(2)),
            record("Q1", Some("KOSDAQ"), Some("S1"), Some(50), Some(dec!(-1.0)), Some(3)),
        ];

        // KOSPI 트리맵은 S1, S2 두 섹터 자식을 가진다
        let kospi = build_treemap(&snapshot, "KOSPI");
        assert_eq!(kospi.children.len(), 2);
        let sector_names: Vec<&str> =
            kospi.children.iter().map(|s| s.name.as_str()).collect();
        assert!(sector_names.contains(&"S1"));
        assert!(sector_names.contains(&"S2"));
        assert_eq!(kospi.leaf_count(), 2);

        // ALL 시가총액 내림차순: 200, 100, 50 순으로 1, 2, 3위
        let ranked = build_ranking(&snapshot, "ALL", RankMetric::MarketCap, RankOrder::Desc, 10);
        assert_eq!(ranked.len(), 3);
        assert_eq!(
            ranked.iter().map(|e| (e.rank, e.market_cap)).collect::<Vec<_>>(),
            vec![(1, 200), (2, 100), (3, 50)]
        );
    }

    #[test]
    fn test_top_and_bottom_is_desc_then_asc() {
        let snapshot = sample_snapshot();
        let combined = build_top_and_bottom(&snapshot, "ALL", 2);
        assert_eq!(combined.len(), 4);
        // 앞 절반: 등락률 내림차순
        assert_eq!(combined[0].symbol, "D");
        assert_eq!(combined[1].symbol, "A");
        // 뒤 절반: 오름차순 (null 맨 앞), 순위는 1부터 다시
        assert_eq!(combined[2].symbol, "C");
        assert_eq!(combined[2].rank, 1);
        assert_eq!(combined[3].symbol, "E");
    }

    proptest! {
        /// KOSPI와 KOSDAQ 트리맵의 리프 수 합은 해당 시장 레코드 수와 같고,
        /// ALL 트리맵은 레코드를 하나도 잃지 않는다.
        #[test]
        fn prop_treemap_partition(
            markets in proptest::collection::vec(
                proptest::option::of(prop_oneof![Just("KOSPI".to_string()), Just("KOSDAQ".to_string())]),
                0..40,
            )
        ) {
            let snapshot: Vec<MarketRecord> = markets
                .iter()
                .enumerate()
                .map(|(i, m)| record(&format!("S{i}"), m.as_deref(), None, Some(i as i64), None, None))
                .collect();

            let kospi = build_treemap(&snapshot, "KOSPI").leaf_count();
            let kosdaq = build_treemap(&snapshot, "KOSDAQ").leaf_count();
            let all = build_treemap(&snapshot, "ALL").leaf_count();

            let kospi_expected = markets.iter().filter(|m| m.as_deref() == Some("KOSPI")).count();
            prop_assert_eq!(kospi, kospi_expected);
            prop_assert_eq!(kospi + kosdaq, markets.iter().filter(|m| m.is_some()).count());
            prop_assert_eq!(all, snapshot.len());
        }

        /// 랭킹 순위는 항상 1..=min(limit, n)의 연속 수열이다.
        #[test]
        fn prop_ranking_dense_ranks(
            caps in proptest::collection::vec(proptest::option::of(0i64..1_000_000), 0..50),
            limit in 0usize..60,
        ) {
            let snapshot: Vec<MarketRecord> = caps
                .iter()
                .enumerate()
                .map(|(i, c)| record(&format!("S{i}"), Some("KOSPI"), None, *c, None, None))
                .collect();

            let ranked = build_ranking(&snapshot, "ALL", RankMetric::MarketCap, RankOrder::Desc, limit);
            prop_assert_eq!(ranked.len(), limit.min(snapshot.len()));
            for (i, entry) in ranked.iter().enumerate() {
                prop_assert_eq!(entry.rank, (i + 1) as u32);
            }
        }

        /// 시가총액 정렬에서 null은 방향과 무관하게 non-null 뒤에 온다.
        #[test]
        fn prop_market_cap_nulls_last(
            caps in proptest::collection::vec(proptest::option::of(0i64..1_000), 1..30),
        ) {
            let snapshot: Vec<MarketRecord> = caps
                .iter()
                .enumerate()
                .map(|(i, c)| record(&format!("S{i}"), Some("KOSPI"), None, *c, None, None))
                .collect();

            for order in [RankOrder::Asc, RankOrder::Desc] {
                let ranked = build_ranking(&snapshot, "ALL", RankMetric::MarketCap, order, 100);
                let null_count = caps.iter().filter(|c| c.is_none()).count();
                let tail = &ranked[ranked.len() - null_count..];
                // null(0으로 보정) 레코드가 전부 꼬리에 위치
                let null_symbols: std::collections::HashSet<String> = caps
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| c.is_none())
                    .map(|(i, _)| format!("S{i}"))
                    .collect();
                for entry in tail {
                    prop_assert!(null_symbols.contains(&entry.symbol));
                }
            }
        }
    }
}
