//! 대시보드 시스템의 에러 타입.
//!
//! 이 모듈은 시스템 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 대시보드 에러.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터 소스 에러 (DB 조회 실패 등)
    #[error("데이터 소스 에러: {0}")]
    DataSource(String),

    /// 외부 피드 에러 (KRX 지수 API 등)
    #[error("외부 피드 에러: {0}")]
    Feed(String),

    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 대시보드 작업을 위한 Result 타입.
pub type DashboardResult<T> = Result<T, DashboardError>;

impl DashboardError {
    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DashboardError::Network(_) | DashboardError::Feed(_))
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        let network_err = DashboardError::Network("timeout".to_string());
        assert!(network_err.is_retryable());

        let input_err = DashboardError::InvalidInput("bad symbol".to_string());
        assert!(!input_err.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = DashboardError::NotFound("treemap_KONEX".to_string());
        assert_eq!(err.to_string(), "찾을 수 없음: treemap_KONEX");
    }
}
