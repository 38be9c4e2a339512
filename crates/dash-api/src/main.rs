//! 대시보드 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다. 기동 시 시장 데이터 캐시를
//! 한 번 적재한 뒤 주기 갱신 태스크를 띄우고, 그 위에서 트리맵/랭킹/
//! 지수/위젯 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Extension, Router};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use dash_api::auth::{hash_password, JwtConfig};
use dash_api::openapi::swagger_ui_router;
use dash_api::routes::create_api_router;
use dash_api::state::AppState;
use dash_core::init_logging_from_env;
use dash_data::{KrxIndexFeed, KrxMarketStore, MarketDataSource, NewUser, UserStore, WidgetStore};
use dash_market::{run_refresh_cycle, start_refresher, MarketViewCache, RefreshConfig};

/// 서버 설정 구조체.
struct ServerConfig {
    /// 바인딩할 호스트 주소
    host: String,
    /// 바인딩할 포트
    port: u16,
    /// PostgreSQL 접속 URL
    database_url: String,
    /// JWT 서명 비밀 키
    jwt_secret: String,
}

impl ServerConfig {
    /// 환경 변수에서 설정 로드.
    ///
    /// `DATABASE_URL`은 필수이며 없으면 에러를 반환합니다.
    fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL 환경변수가 설정되어 있지 않습니다")?;
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using default (INSECURE for development only)");
            "dev-secret-key-change-in-production".to_string()
        });

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret,
        })
    }

    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 `AddrParseError`를 반환합니다.
    fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// 기본 관리자 계정 보장.
///
/// `ADMIN_PASSWORD`가 설정된 경우에만 동작하며, 계정이 이미 있으면
/// 아무것도 하지 않습니다.
async fn ensure_admin_user(pool: &PgPool) {
    let Ok(password) = std::env::var("ADMIN_PASSWORD") else {
        return;
    };
    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());

    match UserStore::exists(pool, &username).await {
        Ok(true) => {}
        Ok(false) => {
            let hash = match hash_password(&password) {
                Ok(hash) => hash,
                Err(e) => {
                    error!(error = %e, "관리자 비밀번호 해시 실패");
                    return;
                }
            };
            match UserStore::insert(
                pool,
                NewUser {
                    username: username.clone(),
                    password_hash: hash,
                    nickname: Some("관리자".to_string()),
                },
            )
            .await
            {
                Ok(user) => {
                    if let Err(e) = WidgetStore::seed_default_widgets(pool, user.user_id).await {
                        warn!(error = %e, "관리자 기본 위젯 생성 실패");
                    }
                    info!(username = %username, "기본 관리자 계정 생성");
                }
                Err(e) => error!(error = %e, "관리자 계정 생성 실패"),
            }
        }
        Err(e) => error!(error = %e, "관리자 계정 확인 실패"),
    }
}

/// CORS 미들웨어 구성.
///
/// CORS_ORIGINS 환경변수가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
///
/// # 환경변수
///
/// - `CORS_ORIGINS`: 쉼표로 구분된 허용 origin 목록
///   예: `https://dashboard.example.com,https://admin.example.com`
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(std::env::var("CORS_ORIGINS").is_ok())
        .max_age(Duration::from_secs(3600))
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>, jwt_secret: String) -> Router {
    Router::new()
        .merge(create_api_router().with_state(state))
        // OpenAPI 문서 및 Swagger UI
        .merge(swagger_ui_router())
        // JWT 추출기가 읽는 비밀 키
        .layer(Extension(JwtConfig { secret: jwt_secret }))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // tracing 초기화
    init_logging_from_env()?;

    info!("Starting dashboard API server...");

    // 설정 로드
    let config = ServerConfig::from_env()?;
    let addr = config.socket_addr().map_err(|e| {
        error!(
            host = %config.host,
            port = config.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. API_HOST, API_PORT 환경변수를 확인하세요."
        );
        e
    })?;

    // 데이터베이스 연결
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database_url)
        .await?;
    sqlx::query("SELECT 1").execute(&pool).await?;
    info!("Connected to PostgreSQL successfully");

    // 기본 관리자 계정 보장 (ADMIN_PASSWORD 설정 시)
    ensure_admin_user(&pool).await;

    // 데이터 소스 및 캐시 구성
    let market_source: Arc<dyn MarketDataSource> = Arc::new(KrxMarketStore::new(pool.clone()));
    let index_feed = Arc::new(KrxIndexFeed::new());
    let cache = Arc::new(MarketViewCache::new());
    let refresh_config = RefreshConfig::from_env();

    // 초기 캐시 적재. 실패해도 서버는 기동하고 다음 주기에 재시도
    match run_refresh_cycle(
        market_source.as_ref(),
        index_feed.as_ref(),
        cache.as_ref(),
        &refresh_config,
    )
    .await
    {
        Ok(published) => info!(published, "초기 시장 데이터 캐시 적재 완료"),
        Err(e) => warn!(error = %e, "초기 캐시 적재 실패, 다음 주기에 재시도"),
    }

    // 전역 종료 토큰 생성 (graceful shutdown용, 백그라운드 태스크에서 사용)
    let shutdown_token = CancellationToken::new();

    // 주기 갱신 태스크 시작
    let refresher = start_refresher(
        market_source.clone(),
        index_feed,
        cache.clone(),
        refresh_config,
        shutdown_token.clone(),
    );

    // AppState 생성
    let state = Arc::new(AppState::new(
        pool,
        market_source,
        cache,
        config.jwt_secret.clone(),
        shutdown_token.clone(),
    ));

    // 라우터 생성
    let app = create_router(state, config.jwt_secret.clone());

    // 서버 시작
    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    // 종료 시그널 받은 후 정리 작업
    info!("Server shutdown initiated, cleaning up...");
    shutdown_token.cancel();

    // 갱신 태스크 종료 대기 (최대 10초)
    if tokio::time::timeout(Duration::from_secs(10), refresher)
        .await
        .is_err()
    {
        warn!("캐시 갱신 태스크 종료 대기 시간 초과");
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C 핸들러 설치 실패");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!(error = %e, "SIGTERM 핸들러 설치 실패"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    // 모든 백그라운드 태스크에 종료 시그널 전파
    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
