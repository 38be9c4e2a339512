//! 사용자 저장소.
//!
//! 회원 계정 관련 데이터베이스 연산을 담당합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::Result;

// ================================================================================================
// Types
// ================================================================================================

/// 사용자 레코드
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserRecord {
    pub user_id: Uuid,
    pub username: String,
    /// Argon2 해시. 응답 직렬화에서 제외합니다.
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sqlx(default)]
    pub nickname: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 새 사용자 입력
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

// ================================================================================================
// Repository
// ================================================================================================

/// User Repository
pub struct UserStore;

impl UserStore {
    /// 아이디로 사용자 조회
    pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<UserRecord>> {
        let record =
            sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(pool)
                .await?;

        Ok(record)
    }

    /// ID로 사용자 조회
    pub async fn find_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(record)
    }

    /// 사용자 생성
    pub async fn insert(pool: &PgPool, input: NewUser) -> Result<UserRecord> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (username, password_hash, nickname)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&input.username)
        .bind(&input.password_hash)
        .bind(&input.nickname)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// 아이디 중복 확인
    pub async fn exists(pool: &PgPool, username: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(pool)
                .await?;

        Ok(count > 0)
    }
}
