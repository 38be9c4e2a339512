//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! # 자동 생성 구조
//!
//! 각 라우트 모듈은 자체 스키마를 정의하고, 중앙 `ApiDoc`에서 집계합니다.
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use dash_core::{
    CachedView, ChartData, MarketRecord, PriceHistoryPoint, RankedEntry, StockSearchItem,
    TreemapNode, TreemapSector, TreemapView,
};
use dash_data::{NewWidget, UpdateWidget, WidgetRecord};

use crate::auth::TokenPair;
use crate::error::ApiErrorResponse;
use crate::routes::widgets::{UpdateLayoutRequest, UpdateNameRequest, UpdateSettingsRequest};
use crate::routes::{
    ComponentStatus, DynamicDataRequest, HealthResponse, LoginRequest, RegisterRequest,
    UserProfileResponse,
};

/// 대시보드 API 문서.
///
/// 모든 엔드포인트와 스키마를 포함하는 OpenAPI 3.0 스펙입니다.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "KRX Market Dashboard API",
        version = "0.1.0",
        description = r#"
# KRX 시장 대시보드 REST API

주기적으로 갱신되는 인메모리 캐시 위에서 트리맵, 랭킹, 지수 데이터를
제공하는 대시보드 백엔드입니다.

## 주요 기능

- **차트**: 시장별 트리맵, 종목 시세 이력
- **랭킹**: 시가총액/거래량/거래대금/등락률 랭킹, Top & Bottom
- **대시보드**: 캐시 키 묶음 일괄 조회 (dynamic-data)
- **종목**: 종목 검색, 복수 종목 최신 시세
- **계정/위젯**: 회원가입, 로그인, 사용자별 위젯 배치 관리

## 인증

`/api/widgets` 전체와 `GET /api/user`는 JWT Bearer 토큰 인증이 필요합니다.
`Authorization: Bearer <token>` 헤더를 포함하세요.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "charts", description = "차트 - 트리맵 및 시세 이력"),
        (name = "market", description = "랭킹 - 정렬 기준별 종목 순위"),
        (name = "dashboard", description = "대시보드 - 캐시 번들 및 스냅샷"),
        (name = "stocks", description = "종목 - 검색 및 시세"),
        (name = "users", description = "사용자 - 가입/로그인/프로필"),
        (name = "widgets", description = "위젯 - 사용자별 대시보드 배치")
    ),
    // ==================== 스키마 등록 ====================
    components(
        schemas(
            // ===== Health =====
            HealthResponse,
            ComponentStatus,

            // ===== Common =====
            ApiErrorResponse,

            // ===== Domain =====
            MarketRecord,
            TreemapView,
            TreemapSector,
            TreemapNode,
            RankedEntry,
            CachedView,
            StockSearchItem,
            PriceHistoryPoint,

            // ===== Charts =====
            ChartData,

            // ===== Dashboard =====
            DynamicDataRequest,

            // ===== Users =====
            RegisterRequest,
            LoginRequest,
            UserProfileResponse,
            TokenPair,

            // ===== Widgets =====
            WidgetRecord,
            NewWidget,
            UpdateWidget,
            UpdateLayoutRequest,
            UpdateSettingsRequest,
            UpdateNameRequest,
        )
    ),
    // ==================== 경로 등록 ====================
    paths(
        // ===== Health =====
        crate::routes::health::health_check,
        crate::routes::health::health_ready,

        // ===== Charts =====
        crate::routes::charts::get_treemap,
        crate::routes::charts::get_price_history,

        // ===== Market =====
        crate::routes::market::get_rank,
        crate::routes::market::get_top_and_bottom,

        // ===== Dashboard =====
        crate::routes::dashboard::get_dynamic_data,
        crate::routes::dashboard::get_market_data,

        // ===== Stocks =====
        crate::routes::stocks::search_stocks,
        crate::routes::stocks::get_quotes,

        // ===== Users =====
        crate::routes::users::register,
        crate::routes::users::login,
        crate::routes::users::get_current_user,

        // ===== Widgets =====
        crate::routes::widgets::list_widgets,
        crate::routes::widgets::create_widget,
        crate::routes::widgets::update_widget_layout,
        crate::routes::widgets::update_widget_settings,
        crate::routes::widgets::update_widget_name,
        crate::routes::widgets::delete_widget,
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Bearer 토큰 security scheme 등록.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// ==================== Swagger UI 라우터 ====================

/// Swagger UI 라우터 생성.
///
/// 다음 경로에 문서 UI를 마운트합니다:
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

// ==================== 테스트 ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_valid() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&spec).unwrap();

        // 기본 정보 확인
        assert!(json.contains("KRX Market Dashboard API"));
        assert!(json.contains("0.1.0"));

        // 태그 확인
        assert!(json.contains("health"));
        assert!(json.contains("charts"));
        assert!(json.contains("market"));
        assert!(json.contains("widgets"));

        // 경로 확인
        assert!(json.contains("/health"));
        assert!(json.contains("/health/ready"));
        assert!(json.contains("/api/charts/treemap/{market}"));
        assert!(json.contains("/api/market/rank"));
        assert!(json.contains("/api/dashboard/dynamic-data"));
        assert!(json.contains("/api/widgets"));
    }

    #[test]
    fn test_swagger_ui_router_creates() {
        let _router: Router<()> = swagger_ui_router();
    }

    #[test]
    fn test_openapi_contains_schemas() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string(&spec).unwrap();

        // 스키마 확인
        assert!(json.contains("HealthResponse"));
        assert!(json.contains("TreemapView"));
        assert!(json.contains("RankedEntry"));
        assert!(json.contains("WidgetRecord"));
        assert!(json.contains("ApiErrorResponse"));
    }
}
