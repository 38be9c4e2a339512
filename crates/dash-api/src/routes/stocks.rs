//! 종목 검색/시세 API 라우트.
//!
//! # 엔드포인트
//!
//! - `GET /api/stocks/search` - 종목명/코드 검색
//! - `GET /api/stocks/quotes` - 복수 종목 최신 시세 조회

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use dash_core::{MarketRecord, StockSearchItem};

use crate::error::{bad_request, internal_error, ApiResult};
use crate::state::AppState;

/// 종목 검색 쿼리.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct SearchQuery {
    /// 검색어 (종목명 일부 또는 종목 코드 접두어, 최소 2자)
    pub query: String,
    /// 최대 결과 수 (기본: 20)
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

/// 복수 시세 조회 쿼리.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct QuotesQuery {
    /// 쉼표로 구분한 종목 코드 목록 (예: `005930,000660`)
    pub symbols: String,
}

fn default_search_limit() -> i64 {
    20
}

/// GET /api/stocks/search - 종목 검색.
///
/// 검색어가 2자 미만이면 400을 반환합니다.
#[utoipa::path(
    get,
    path = "/api/stocks/search",
    tag = "stocks",
    params(SearchQuery),
    responses(
        (status = 200, description = "검색 결과", body = [StockSearchItem]),
        (status = 400, description = "검색어가 너무 짧음")
    )
)]
pub async fn search_stocks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<StockSearchItem>>> {
    let term = query.query.trim();
    if term.chars().count() < 2 {
        return Err(bad_request("검색어는 2자 이상이어야 합니다"));
    }

    debug!(query = %term, "종목 검색 요청");

    let items = state
        .market_source
        .search_by_name(term, query.limit)
        .await
        .map_err(|err| {
            error!(error = %err, "종목 검색 실패");
            internal_error("종목을 검색하지 못했습니다")
        })?;
    Ok(Json(items))
}

/// GET /api/stocks/quotes - 복수 종목 최신 시세 조회.
///
/// `symbols`가 비어 있으면 400을 반환합니다.
#[utoipa::path(
    get,
    path = "/api/stocks/quotes",
    tag = "stocks",
    params(QuotesQuery),
    responses(
        (status = 200, description = "종목별 최신 시세", body = [MarketRecord]),
        (status = 400, description = "종목 코드 누락")
    )
)]
pub async fn get_quotes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuotesQuery>,
) -> ApiResult<Json<Vec<MarketRecord>>> {
    let symbols: Vec<String> = query
        .symbols
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if symbols.is_empty() {
        return Err(bad_request("종목 코드를 하나 이상 지정해야 합니다"));
    }

    debug!(symbol_count = symbols.len(), "복수 시세 조회 요청");

    let records = state
        .market_source
        .fetch_latest_quotes(&symbols)
        .await
        .map_err(|err| {
            error!(error = %err, "복수 시세 조회 실패");
            internal_error("시세를 조회하지 못했습니다")
        })?;
    Ok(Json(records))
}

/// 종목 라우터.
pub fn stocks_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search", get(search_stocks))
        .route("/quotes", get(get_quotes))
}
