//! 랭킹 API 라우트.
//!
//! # 엔드포인트
//!
//! - `GET /api/market/rank` - 정렬 기준별 랭킹
//! - `GET /api/market/rank/top-and-bottom` - 등락률 상위/하위 결합

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use dash_core::{RankMetric, RankOrder, RankedEntry};

use crate::state::AppState;

/// 랭킹 조회 쿼리.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct RankQuery {
    /// 정렬 기준 (MARKET_CAP, VOLUME, TRADE_VALUE, CHANGE_RATE)
    #[serde(default = "default_by")]
    pub by: String,
    /// 시장 필터 (KOSPI, KOSDAQ, ALL)
    #[serde(default = "default_market")]
    pub market: String,
    /// 정렬 방향 (ASC, DESC)
    #[serde(default = "default_order")]
    pub order: String,
    /// 반환 개수 (기본: 20)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Top & Bottom 조회 쿼리.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct TopAndBottomQuery {
    /// 시장 필터 (기본: ALL)
    #[serde(default = "default_market")]
    pub market: String,
    /// 반환 개수 (상위/하위 합, 기본: 20)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_by() -> String {
    "MARKET_CAP".to_string()
}

fn default_market() -> String {
    "ALL".to_string()
}

fn default_order() -> String {
    "DESC".to_string()
}

fn default_limit() -> usize {
    20
}

/// GET /api/market/rank - 랭킹 조회.
///
/// 캐시에 해당 키가 없으면 빈 리스트를 반환합니다 (에러 아님).
#[utoipa::path(
    get,
    path = "/api/market/rank",
    tag = "market",
    params(RankQuery),
    responses((status = 200, description = "랭킹 목록", body = [RankedEntry]))
)]
pub async fn get_rank(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RankQuery>,
) -> Json<Vec<RankedEntry>> {
    debug!(?query, "랭킹 조회 요청");

    let by = RankMetric::parse_lenient(&query.by);
    let order = RankOrder::parse_lenient(&query.order);

    let entries = state
        .dashboard
        .get_ranking(by, &query.market, order, query.limit)
        .await;
    Json(entries)
}

/// GET /api/market/rank/top-and-bottom - 등락률 상위/하위 조회.
#[utoipa::path(
    get,
    path = "/api/market/rank/top-and-bottom",
    tag = "market",
    params(TopAndBottomQuery),
    responses((status = 200, description = "상위/하위 결합 목록", body = [RankedEntry]))
)]
pub async fn get_top_and_bottom(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopAndBottomQuery>,
) -> Json<Vec<RankedEntry>> {
    debug!(?query, "Top & Bottom 랭킹 조회 요청");

    let entries = state
        .dashboard
        .get_top_and_bottom(&query.market, query.limit)
        .await;
    Json(entries)
}

/// 랭킹 라우터.
pub fn market_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rank", get(get_rank))
        .route("/rank/top-and-bottom", get(get_top_and_bottom))
}
