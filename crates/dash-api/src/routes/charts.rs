//! 차트 API 라우트.
//!
//! # 엔드포인트
//!
//! - `GET /api/charts/treemap/{market}` - 시장 트리맵
//! - `GET /api/charts/krx/history` - 종목 시세 이력

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use dash_core::{ChartData, TreemapView};

use crate::error::{bad_request, internal_error, not_found, ApiResult};
use crate::state::AppState;

/// 시세 이력 조회 쿼리.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct HistoryQuery {
    /// 종목 코드 (필수)
    pub symbol: String,
    /// 조회 기간(일) (기본: 365)
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    365
}

/// GET /api/charts/treemap/{market} - 시장 트리맵 조회.
#[utoipa::path(
    get,
    path = "/api/charts/treemap/{market}",
    tag = "charts",
    params(("market" = String, Path, description = "시장 구분 (KOSPI, KOSDAQ, ALL, ETF)")),
    responses(
        (status = 200, description = "트리맵 계층", body = TreemapView),
        (status = 404, description = "아직 게시되지 않은 시장")
    )
)]
pub async fn get_treemap(
    State(state): State<Arc<AppState>>,
    Path(market): Path<String>,
) -> ApiResult<Json<TreemapView>> {
    let view = state
        .dashboard
        .get_treemap(&market)
        .await
        .ok_or_else(|| not_found(format!("트리맵 데이터 없음: {market}")))?;

    let treemap = view
        .as_treemap()
        .ok_or_else(|| not_found(format!("트리맵 데이터 없음: {market}")))?;

    Ok(Json(treemap.clone()))
}

/// GET /api/charts/krx/history - 종목 시세 이력 조회.
#[utoipa::path(
    get,
    path = "/api/charts/krx/history",
    tag = "charts",
    params(HistoryQuery),
    responses(
        (status = 200, description = "차트 데이터", body = ChartData),
        (status = 400, description = "빈 종목 코드"),
        (status = 404, description = "시세 이력 없음")
    )
)]
pub async fn get_price_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<ChartData>> {
    let symbol = query.symbol.trim();
    if symbol.is_empty() {
        return Err(bad_request("종목 코드가 비어 있습니다"));
    }

    let from = (Utc::now() - Duration::days(query.days.max(1))).date_naive();
    debug!(symbol = symbol, days = query.days, "시세 이력 조회");

    let history = state
        .market_source
        .fetch_price_history(symbol, from)
        .await
        .map_err(|e| internal_error(format!("시세 이력 조회 실패: {e}")))?;

    if history.is_empty() {
        return Err(not_found(format!("시세 이력 없음: {symbol}")));
    }

    let stock_name = state
        .market_source
        .fetch_stock_name(symbol)
        .await
        .map_err(|e| internal_error(format!("종목명 조회 실패: {e}")))?
        .unwrap_or_else(|| symbol.to_string());

    Ok(Json(ChartData {
        stock_name,
        history,
    }))
}

/// 차트 라우터.
pub fn charts_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/treemap/{market}", get(get_treemap))
        .route("/krx/history", get(get_price_history))
}
