//! 대시보드 위젯 API 라우트 (인증 필요).
//!
//! # 엔드포인트
//!
//! - `GET /api/widgets` - 내 위젯 목록
//! - `POST /api/widgets` - 위젯 추가
//! - `PUT /api/widgets/{widget_id}/layout` - 배치 수정
//! - `PUT /api/widgets/{widget_id}/settings` - 설정 수정
//! - `PUT /api/widgets/{widget_id}/name` - 이름 수정
//! - `DELETE /api/widgets/{widget_id}` - 위젯 삭제

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use dash_data::{NewWidget, UpdateWidget, WidgetRecord, WidgetStore};

use crate::auth::{Claims, JwtAuth};
use crate::error::{internal_error, not_found, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 배치 수정 요청.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLayoutRequest {
    pub layout_info: Value,
}

/// 설정 수정 요청.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub widget_settings: Value,
}

/// 이름 수정 요청.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNameRequest {
    pub widget_name: String,
}

fn owner_id(claims: &Claims) -> ApiResult<Uuid> {
    Uuid::parse_str(&claims.sub).map_err(|_| {
        (
            StatusCode::UNAUTHORIZED,
            axum::Json(ApiErrorResponse::new(
                "UNAUTHORIZED",
                "토큰의 사용자 식별자가 올바르지 않습니다",
            )),
        )
    })
}

fn store_error(err: dash_data::DataError) -> (StatusCode, Json<ApiErrorResponse>) {
    error!(error = %err, "위젯 저장소 연산 실패");
    internal_error("위젯을 처리하지 못했습니다")
}

/// GET /api/widgets - 내 위젯 목록.
#[utoipa::path(
    get,
    path = "/api/widgets",
    tag = "widgets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "위젯 목록", body = [WidgetRecord]),
        (status = 401, description = "인증 실패")
    )
)]
pub async fn list_widgets(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
) -> ApiResult<Json<Vec<WidgetRecord>>> {
    let user_id = owner_id(&claims)?;
    let widgets = WidgetStore::get_by_user(&state.db_pool, user_id)
        .await
        .map_err(store_error)?;
    Ok(Json(widgets))
}

/// POST /api/widgets - 위젯 추가.
#[utoipa::path(
    post,
    path = "/api/widgets",
    tag = "widgets",
    security(("bearer_auth" = [])),
    request_body = NewWidget,
    responses(
        (status = 201, description = "생성된 위젯", body = WidgetRecord),
        (status = 401, description = "인증 실패")
    )
)]
pub async fn create_widget(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
    Json(input): Json<NewWidget>,
) -> ApiResult<(StatusCode, Json<WidgetRecord>)> {
    let user_id = owner_id(&claims)?;
    let widget = WidgetStore::insert(&state.db_pool, user_id, input)
        .await
        .map_err(store_error)?;

    info!(user_id = %user_id, widget_id = %widget.widget_id, "위젯 생성");
    Ok((StatusCode::CREATED, Json(widget)))
}

/// PUT /api/widgets/{widget_id}/layout - 배치 수정.
#[utoipa::path(
    put,
    path = "/api/widgets/{widget_id}/layout",
    tag = "widgets",
    security(("bearer_auth" = [])),
    params(("widget_id" = Uuid, Path, description = "위젯 ID")),
    request_body = UpdateLayoutRequest,
    responses(
        (status = 200, description = "수정된 위젯", body = WidgetRecord),
        (status = 404, description = "위젯 없음 또는 소유자 아님")
    )
)]
pub async fn update_widget_layout(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
    Path(widget_id): Path<Uuid>,
    Json(request): Json<UpdateLayoutRequest>,
) -> ApiResult<Json<WidgetRecord>> {
    let user_id = owner_id(&claims)?;
    let update = UpdateWidget {
        widget_name: None,
        layout_info: Some(request.layout_info),
        widget_settings: None,
    };
    apply_update(&state, user_id, widget_id, update).await
}

/// PUT /api/widgets/{widget_id}/settings - 설정 수정.
#[utoipa::path(
    put,
    path = "/api/widgets/{widget_id}/settings",
    tag = "widgets",
    security(("bearer_auth" = [])),
    params(("widget_id" = Uuid, Path, description = "위젯 ID")),
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "수정된 위젯", body = WidgetRecord),
        (status = 404, description = "위젯 없음 또는 소유자 아님")
    )
)]
pub async fn update_widget_settings(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
    Path(widget_id): Path<Uuid>,
    Json(request): Json<UpdateSettingsRequest>,
) -> ApiResult<Json<WidgetRecord>> {
    let user_id = owner_id(&claims)?;
    let update = UpdateWidget {
        widget_name: None,
        layout_info: None,
        widget_settings: Some(request.widget_settings),
    };
    apply_update(&state, user_id, widget_id, update).await
}

/// PUT /api/widgets/{widget_id}/name - 이름 수정.
#[utoipa::path(
    put,
    path = "/api/widgets/{widget_id}/name",
    tag = "widgets",
    security(("bearer_auth" = [])),
    params(("widget_id" = Uuid, Path, description = "위젯 ID")),
    request_body = UpdateNameRequest,
    responses(
        (status = 200, description = "수정된 위젯", body = WidgetRecord),
        (status = 404, description = "위젯 없음 또는 소유자 아님")
    )
)]
pub async fn update_widget_name(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
    Path(widget_id): Path<Uuid>,
    Json(request): Json<UpdateNameRequest>,
) -> ApiResult<Json<WidgetRecord>> {
    let user_id = owner_id(&claims)?;
    let update = UpdateWidget {
        widget_name: Some(request.widget_name),
        layout_info: None,
        widget_settings: None,
    };
    apply_update(&state, user_id, widget_id, update).await
}

/// DELETE /api/widgets/{widget_id} - 위젯 삭제.
#[utoipa::path(
    delete,
    path = "/api/widgets/{widget_id}",
    tag = "widgets",
    security(("bearer_auth" = [])),
    params(("widget_id" = Uuid, Path, description = "위젯 ID")),
    responses(
        (status = 204, description = "삭제 완료"),
        (status = 404, description = "위젯 없음 또는 소유자 아님")
    )
)]
pub async fn delete_widget(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
    Path(widget_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let user_id = owner_id(&claims)?;
    let deleted = WidgetStore::delete(&state.db_pool, user_id, widget_id)
        .await
        .map_err(store_error)?;
    if !deleted {
        return Err(not_found("위젯을 찾을 수 없습니다"));
    }

    info!(user_id = %user_id, widget_id = %widget_id, "위젯 삭제");
    Ok(StatusCode::NO_CONTENT)
}

async fn apply_update(
    state: &AppState,
    user_id: Uuid,
    widget_id: Uuid,
    update: UpdateWidget,
) -> ApiResult<Json<WidgetRecord>> {
    let widget = WidgetStore::update(&state.db_pool, user_id, widget_id, update)
        .await
        .map_err(store_error)?
        .ok_or_else(|| not_found("위젯을 찾을 수 없습니다"))?;
    Ok(Json(widget))
}

/// 위젯 라우터.
pub fn widgets_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_widgets).post(create_widget))
        .route("/{widget_id}/layout", put(update_widget_layout))
        .route("/{widget_id}/settings", put(update_widget_settings))
        .route("/{widget_id}/name", put(update_widget_name))
        .route("/{widget_id}", delete(delete_widget))
}
