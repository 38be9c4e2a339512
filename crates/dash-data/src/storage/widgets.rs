//! 위젯 저장소.
//!
//! 사용자별 대시보드 위젯 배치 정보를 담당합니다. 배치(`layout_info`)와
//! 위젯별 설정(`widget_settings`)은 JSONB로 저장하고 프런트엔드에는
//! 그대로 전달합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::Result;

// ================================================================================================
// Types
// ================================================================================================

/// 위젯 레코드
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WidgetRecord {
    pub widget_id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub widget_name: String,
    pub widget_type: String,
    pub layout_info: Value,
    #[sqlx(default)]
    pub widget_settings: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 새 위젯 입력
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewWidget {
    pub widget_name: String,
    pub widget_type: String,
    pub layout_info: Value,
    #[serde(default)]
    pub widget_settings: Option<Value>,
}

/// 위젯 업데이트 입력
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWidget {
    #[serde(default)]
    pub widget_name: Option<String>,
    #[serde(default)]
    pub layout_info: Option<Value>,
    #[serde(default)]
    pub widget_settings: Option<Value>,
}

// ================================================================================================
// Repository
// ================================================================================================

/// Widget Repository
pub struct WidgetStore;

impl WidgetStore {
    /// 사용자의 모든 위젯 조회
    pub async fn get_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<WidgetRecord>> {
        let records = sqlx::query_as::<_, WidgetRecord>(
            "SELECT * FROM user_widgets WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// 위젯 추가
    pub async fn insert(pool: &PgPool, user_id: Uuid, input: NewWidget) -> Result<WidgetRecord> {
        let record = sqlx::query_as::<_, WidgetRecord>(
            r#"
            INSERT INTO user_widgets
                (user_id, widget_name, widget_type, layout_info, widget_settings)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&input.widget_name)
        .bind(&input.widget_type)
        .bind(&input.layout_info)
        .bind(&input.widget_settings)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// 위젯 수정 (이름, 배치, 설정)
    ///
    /// 소유자가 아닌 위젯은 수정되지 않고 `None`을 반환합니다.
    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        widget_id: Uuid,
        input: UpdateWidget,
    ) -> Result<Option<WidgetRecord>> {
        let record = sqlx::query_as::<_, WidgetRecord>(
            r#"
            UPDATE user_widgets
            SET
                widget_name = COALESCE($3, widget_name),
                layout_info = COALESCE($4, layout_info),
                widget_settings = COALESCE($5, widget_settings),
                updated_at = NOW()
            WHERE widget_id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(widget_id)
        .bind(user_id)
        .bind(&input.widget_name)
        .bind(&input.layout_info)
        .bind(&input.widget_settings)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// 위젯 삭제
    pub async fn delete(pool: &PgPool, user_id: Uuid, widget_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM user_widgets WHERE widget_id = $1 AND user_id = $2")
                .bind(widget_id)
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 신규 가입자 기본 위젯 생성
    ///
    /// 통합 시장 트리맵과 Top & Bottom 순위표를 기본 배치로 넣어줍니다.
    pub async fn seed_default_widgets(pool: &PgPool, user_id: Uuid) -> Result<()> {
        let defaults = [
            NewWidget {
                widget_name: "통합 시장 현황".to_string(),
                widget_type: "TreemapChart".to_string(),
                layout_info: json!({
                    "lg": { "x": 0, "y": 0, "w": 2, "h": 8 },
                    "md": { "x": 0, "y": 0, "w": 2, "h": 8 },
                    "sm": { "x": 0, "y": 0, "w": 2, "h": 6 }
                }),
                widget_settings: Some(json!({ "marketType": "ALL" })),
            },
            NewWidget {
                widget_name: "등락률 Top & Bottom".to_string(),
                widget_type: "RankTable".to_string(),
                layout_info: json!({
                    "lg": { "x": 2, "y": 0, "w": 2, "h": 8 },
                    "md": { "x": 0, "y": 8, "w": 2, "h": 8 },
                    "sm": { "x": 0, "y": 6, "w": 2, "h": 8 }
                }),
                widget_settings: Some(json!({
                    "mode": "top-and-bottom",
                    "visibleColumns": ["currentPrice", "changeRate"]
                })),
            },
        ];

        for widget in defaults {
            Self::insert(pool, user_id, widget).await?;
        }

        info!(%user_id, "기본 위젯 생성 완료");
        Ok(())
    }
}
