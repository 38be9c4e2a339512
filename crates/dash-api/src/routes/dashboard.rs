//! 대시보드 동적 데이터 API 라우트.
//!
//! # 엔드포인트
//!
//! - `POST /api/dashboard/dynamic-data` - 캐시 키 묶음 일괄 조회
//! - `GET /api/market-data` - 원본 시장 스냅샷 조회 (날짜 지정 가능)

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use dash_core::MarketRecord;

use crate::error::{internal_error, ApiResult};
use crate::state::AppState;

/// 동적 데이터 일괄 조회 요청.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DynamicDataRequest {
    /// 조회할 캐시 키 목록 (예: `treemap_KOSPI`, `rank_ALL_VOLUME_DESC`)
    pub keys: Vec<String>,
}

/// 스냅샷 조회 쿼리.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct MarketDataQuery {
    /// 기준일 (yyyy-MM-dd). 생략 시 최신 장중 데이터.
    pub date: Option<NaiveDate>,
}

/// POST /api/dashboard/dynamic-data - 캐시 키 묶음 일괄 조회.
///
/// 요청한 키 중 캐시에 없는 키는 응답에서 제외됩니다.
#[utoipa::path(
    post,
    path = "/api/dashboard/dynamic-data",
    tag = "dashboard",
    request_body = DynamicDataRequest,
    responses((status = 200, description = "키별 캐시 뷰 맵", body = Object))
)]
pub async fn get_dynamic_data(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DynamicDataRequest>,
) -> Json<HashMap<String, Value>> {
    debug!(key_count = request.keys.len(), "동적 데이터 일괄 조회 요청");

    let bundle = state.dashboard.get_dynamic_bundle(&request.keys).await;
    let body = bundle
        .into_iter()
        .filter_map(|(key, view)| match serde_json::to_value(view.as_ref()) {
            Ok(value) => Some((key, value)),
            Err(err) => {
                error!(key = %key, error = %err, "캐시 뷰 직렬화 실패");
                None
            }
        })
        .collect();
    Json(body)
}

/// GET /api/market-data - 원본 시장 스냅샷 조회.
///
/// `date` 쿼리가 있으면 해당 날짜의 장 마감 데이터를,
/// 없으면 최신 장중 데이터를 반환합니다.
#[utoipa::path(
    get,
    path = "/api/market-data",
    tag = "dashboard",
    params(MarketDataQuery),
    responses((status = 200, description = "시장 스냅샷", body = [MarketRecord]))
)]
pub async fn get_market_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MarketDataQuery>,
) -> ApiResult<Json<Vec<MarketRecord>>> {
    let records = match query.date {
        Some(date) => state.market_source.fetch_snapshot_as_of(date).await,
        None => state.market_source.fetch_live_snapshot().await,
    }
    .map_err(|err| {
        error!(error = %err, "시장 스냅샷 조회 실패");
        internal_error("시장 데이터를 조회하지 못했습니다")
    })?;

    Ok(Json(records))
}

/// 대시보드 라우터.
pub fn dashboard_router() -> Router<Arc<AppState>> {
    Router::new().route("/dynamic-data", post(get_dynamic_data))
}
