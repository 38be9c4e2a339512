//! 사용자 계정 API 라우트.
//!
//! # 엔드포인트
//!
//! - `POST /api/users/register` - 회원 가입 (기본 위젯 포함)
//! - `POST /api/users/login` - 로그인 및 토큰 발급
//! - `GET /api/user` - 현재 로그인 사용자 조회

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use dash_data::{NewUser, UserStore, WidgetStore};

use crate::auth::{create_token_pair, hash_password, verify_password, JwtAuth, TokenPair};
use crate::error::{bad_request, conflict, internal_error, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// Access Token 만료 시간 (분).
const ACCESS_TOKEN_EXPIRES_MINUTES: i64 = 60;

/// 회원 가입 요청.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// 로그인 아이디 (4자 이상)
    pub username: String,
    /// 비밀번호 (8자 이상)
    pub password: String,
    /// 표시 이름 (선택)
    #[serde(default)]
    pub nickname: Option<String>,
}

/// 로그인 요청.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 사용자 프로필 응답.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub user_id: Uuid,
    pub username: String,
    pub nickname: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn unauthorized(message: impl Into<String>) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiErrorResponse::new("UNAUTHORIZED", message)),
    )
}

/// POST /api/users/register - 회원 가입.
///
/// 가입과 동시에 기본 대시보드 위젯을 생성합니다.
#[utoipa::path(
    post,
    path = "/api/users/register",
    tag = "users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "가입 완료", body = UserProfileResponse),
        (status = 400, description = "입력값 오류"),
        (status = 409, description = "아이디 중복")
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserProfileResponse>)> {
    let username = request.username.trim();
    if username.chars().count() < 4 {
        return Err(bad_request("아이디는 4자 이상이어야 합니다"));
    }
    if request.password.chars().count() < 8 {
        return Err(bad_request("비밀번호는 8자 이상이어야 합니다"));
    }

    let already = UserStore::exists(&state.db_pool, username)
        .await
        .map_err(|err| {
            error!(error = %err, "아이디 중복 확인 실패");
            internal_error("회원 가입을 처리하지 못했습니다")
        })?;
    if already {
        return Err(conflict("이미 사용 중인 아이디입니다"));
    }

    let password_hash = hash_password(&request.password).map_err(|err| {
        error!(error = %err, "비밀번호 해시 실패");
        internal_error("회원 가입을 처리하지 못했습니다")
    })?;

    let user = UserStore::insert(
        &state.db_pool,
        NewUser {
            username: username.to_string(),
            password_hash,
            nickname: request.nickname,
        },
    )
    .await
    .map_err(|err| {
        error!(error = %err, "사용자 생성 실패");
        internal_error("회원 가입을 처리하지 못했습니다")
    })?;

    // 기본 위젯 생성 실패는 가입 자체를 막지 않습니다.
    if let Err(err) = WidgetStore::seed_default_widgets(&state.db_pool, user.user_id).await {
        warn!(user_id = %user.user_id, error = %err, "기본 위젯 생성 실패");
    }

    info!(user_id = %user.user_id, username = %user.username, "회원 가입 완료");

    Ok((
        StatusCode::CREATED,
        Json(UserProfileResponse {
            user_id: user.user_id,
            username: user.username,
            nickname: user.nickname,
            created_at: user.created_at,
        }),
    ))
}

/// POST /api/users/login - 로그인.
///
/// 자격 증명이 틀리면 아이디/비밀번호 중 무엇이 틀렸는지
/// 구분하지 않고 동일한 401을 반환합니다.
#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "토큰 발급", body = TokenPair),
        (status = 401, description = "자격 증명 불일치")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    let user = UserStore::find_by_username(&state.db_pool, request.username.trim())
        .await
        .map_err(|err| {
            error!(error = %err, "사용자 조회 실패");
            internal_error("로그인을 처리하지 못했습니다")
        })?
        .ok_or_else(|| unauthorized("아이디 또는 비밀번호가 올바르지 않습니다"))?;

    verify_password(&request.password, &user.password_hash)
        .map_err(|_| unauthorized("아이디 또는 비밀번호가 올바르지 않습니다"))?;

    let tokens = create_token_pair(
        &user.user_id.to_string(),
        &user.username,
        &state.jwt_secret,
        ACCESS_TOKEN_EXPIRES_MINUTES,
    )
    .map_err(|err| {
        error!(error = %err, "토큰 발급 실패");
        internal_error("로그인을 처리하지 못했습니다")
    })?;

    info!(user_id = %user.user_id, "로그인 성공");
    Ok(Json(tokens))
}

/// GET /api/user - 현재 로그인 사용자 조회.
#[utoipa::path(
    get,
    path = "/api/user",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "사용자 프로필", body = UserProfileResponse),
        (status = 401, description = "인증 실패")
    )
)]
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
) -> ApiResult<Json<UserProfileResponse>> {
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| unauthorized("토큰의 사용자 식별자가 올바르지 않습니다"))?;

    let user = UserStore::find_by_id(&state.db_pool, user_id)
        .await
        .map_err(|err| {
            error!(error = %err, "사용자 조회 실패");
            internal_error("사용자 정보를 조회하지 못했습니다")
        })?
        .ok_or_else(|| unauthorized("존재하지 않는 사용자입니다"))?;

    Ok(Json(UserProfileResponse {
        user_id: user.user_id,
        username: user.username,
        nickname: user.nickname,
        created_at: user.created_at,
    }))
}

/// 사용자 계정 라우터 (`/api/users` 하위).
///
/// `GET /api/user`는 원 경로 유지를 위해 상위 라우터에서 직접 등록합니다.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
